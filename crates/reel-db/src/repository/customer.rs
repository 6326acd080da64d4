//! # Customer Repository
//!
//! Finds, creates and maintains customers.
//!
//! ## Resolver
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_or_create(email, first?, last?)                               │
//! │       │                                                                 │
//! │       ├── email shape invalid ──────────► Rule(Validation)             │
//! │       │                                                                 │
//! │       ├── find_by_email(email) = Some ──► existing customer, unchanged │
//! │       │                                                                 │
//! │       ├── first/last blank ─────────────► Rule(IncompleteCustomerInfo) │
//! │       │                                                                 │
//! │       ├── no address row in the store ──► Storage(NotFound "Address")  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT customer (active) → re-read by email → new customer            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Email uniqueness is a business rule. The store does not enforce it, so
//! the resolver only ever inserts after a miss, and [`CustomerRepository::update`]
//! refuses an email owned by someone else. Both run the check and the write
//! in one transaction that starts with a write statement, so concurrent
//! callers queue on SQLite's write lock instead of both passing the check.

use tracing::{debug, info};

use reel_core::validation::validate_email;
use reel_core::{Customer, CustomerUpdate, NewCustomer, Page, PageRequest, SearchTerm, ValidationError};

use crate::error::{DbError, DbResult, WorkflowResult};
use crate::gateway::{execute, fetch_count, fetch_optional_as, QueryGateway, Statement};
use crate::search::{CustomerSearchQuery, CUSTOMER_COLUMNS};

/// No-op write on the rows holding `email`. Makes the transaction a writer
/// before the email is looked up.
const CLAIM_EMAIL: &str = "UPDATE customer SET email = email WHERE email = ?";

/// No-op write on one customer row.
const LOCK_CUSTOMER: &str = "UPDATE customer SET active = active WHERE customer_id = ?";

const FIRST_ADDRESS: &str = "SELECT address_id FROM address ORDER BY address_id LIMIT 1";

fn by_email(email: &str) -> Statement {
    Statement::new(format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE email = ? ORDER BY customer_id LIMIT 1"
    ))
    .bind(email)
}

fn by_id(customer_id: i64) -> Statement {
    Statement::new(format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE customer_id = ?"
    ))
    .bind(customer_id)
}

/// Repository for customer operations.
///
/// ## Usage
/// ```rust,ignore
/// let customers = db.customers();
///
/// let customer = customers
///     .resolve_or_create("new@example.com", Some("Jane"), Some("Doe"))
///     .await?;
///
/// let page = customers
///     .search_customers(&PageRequest::new(1, 20), SearchTerm::parse("smith").as_ref())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    gateway: QueryGateway,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(gateway: QueryGateway) -> Self {
        CustomerRepository { gateway }
    }

    /// Looks up a customer by exact, case-sensitive email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        self.gateway.fetch_optional_as(&by_email(email)).await
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, customer_id: i64) -> DbResult<Option<Customer>> {
        self.gateway.fetch_optional_as(&by_id(customer_id)).await
    }

    /// Returns the customer with this email, creating one if needed.
    ///
    /// ## Behavior
    /// - Existing email: the stored customer is returned as is. Names sent
    ///   along are ignored.
    /// - New email: both names must be present. The customer is created
    ///   active, at the store's lowest address id.
    ///
    /// Inserts at most one row per call. Concurrent calls for the same new
    /// email create one customer between them.
    pub async fn resolve_or_create(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> WorkflowResult<Customer> {
        validate_email(email)?;
        let email = email.trim();

        if let Some(existing) = self.find_by_email(email).await? {
            debug!(customer_id = existing.customer_id, "Resolved existing customer");
            return Ok(existing);
        }

        let new_customer = NewCustomer::from_parts(email, first_name, last_name)?;

        let mut tx = self.gateway.begin().await?;
        execute(&mut *tx, &Statement::new(CLAIM_EMAIL).bind(email)).await?;

        // Created by a concurrent call since the first lookup
        let raced: Option<Customer> = fetch_optional_as(&mut *tx, &by_email(email)).await?;
        if let Some(existing) = raced {
            tx.rollback().await?;
            debug!(customer_id = existing.customer_id, "Resolved customer created concurrently");
            return Ok(existing);
        }

        let address: Option<(i64,)> =
            fetch_optional_as(&mut *tx, &Statement::new(FIRST_ADDRESS)).await?;
        let Some((address_id,)) = address else {
            return Err(DbError::not_found("Address", "any").into());
        };

        let insert = Statement::new(
            "INSERT INTO customer (first_name, last_name, email, address_id, active) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new_customer.first_name.as_str())
        .bind(new_customer.last_name.as_str())
        .bind(new_customer.email.as_str())
        .bind(address_id)
        .bind(true);
        execute(&mut *tx, &insert).await?;

        let created: Option<Customer> = fetch_optional_as(&mut *tx, &by_email(email)).await?;
        let created = created.ok_or_else(|| DbError::not_found("Customer", email))?;
        tx.commit().await?;

        info!(
            customer_id = created.customer_id,
            address_id, "Customer created"
        );
        Ok(created)
    }

    /// Applies a partial update and returns the updated customer.
    ///
    /// ## Errors
    /// - `Storage(NotFound)` when the customer doesn't exist
    /// - `Rule(Validation(Duplicate))` when the new email belongs to another
    ///   customer
    pub async fn update(
        &self,
        customer_id: i64,
        update: &CustomerUpdate,
    ) -> WorkflowResult<Customer> {
        update.validate()?;

        let mut tx = self.gateway.begin().await?;
        execute(&mut *tx, &Statement::new(LOCK_CUSTOMER).bind(customer_id)).await?;

        let current: Option<Customer> = fetch_optional_as(&mut *tx, &by_id(customer_id)).await?;
        let current = current.ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        if update.is_empty() {
            tx.rollback().await?;
            return Ok(current);
        }

        let updated = update.apply_to(&current);

        if let Some(email) = updated.email.as_deref() {
            if updated.email != current.email {
                let owners = fetch_count(
                    &mut *tx,
                    &Statement::new(
                        "SELECT COUNT(*) FROM customer WHERE email = ? AND customer_id <> ?",
                    )
                    .bind(email)
                    .bind(customer_id),
                )
                .await?;

                if owners > 0 {
                    tx.rollback().await?;
                    return Err(ValidationError::Duplicate {
                        field: "email".to_string(),
                        value: email.to_string(),
                    }
                    .into());
                }
            }
        }

        let statement = Statement::new(
            "UPDATE customer SET first_name = ?, last_name = ?, email = ?, active = ? \
             WHERE customer_id = ?",
        )
        .bind(updated.first_name.as_str())
        .bind(updated.last_name.as_str())
        .bind(updated.email.clone())
        .bind(updated.active)
        .bind(customer_id);
        execute(&mut *tx, &statement).await?;
        tx.commit().await?;

        info!(customer_id, "Customer updated");
        Ok(updated)
    }

    /// Deletes a customer.
    ///
    /// A customer that still has rentals is refused by the store with a
    /// foreign-key error, which is returned unchanged.
    pub async fn delete(&self, customer_id: i64) -> DbResult<()> {
        let deleted = self
            .gateway
            .execute(&Statement::new("DELETE FROM customer WHERE customer_id = ?").bind(customer_id))
            .await?;

        if deleted == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        info!(customer_id, "Customer deleted");
        Ok(())
    }

    /// One page of customers, optionally filtered by a search term.
    ///
    /// Rows are ordered by last name, then first name, then id, so pages
    /// are stable.
    pub async fn search_customers(
        &self,
        page: &PageRequest,
        search: Option<&SearchTerm>,
    ) -> DbResult<Page<Customer>> {
        let query = CustomerSearchQuery::build(page, search);

        debug!(
            page = page.page(),
            page_size = page.page_size(),
            search = search.map(SearchTerm::text),
            "Searching customers"
        );

        let rows: Vec<Customer> = self.gateway.fetch_all_as(&query.listing).await?;
        let total = self.gateway.fetch_count(&query.count).await?;

        Ok(Page::new(rows, total, page))
    }

    /// Total number of customers.
    pub async fn count(&self) -> DbResult<i64> {
        self.gateway
            .fetch_count(&Statement::new("SELECT COUNT(*) FROM customer"))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::fixtures::{self, CUSTOMER_COUNT, CUSTOMER_WITH_OPEN_RENTAL};
    use crate::pool::{Database, DbConfig};
    use reel_core::CoreError;

    async fn repo() -> CustomerRepository {
        fixtures::demo_database().await.unwrap().customers()
    }

    #[tokio::test]
    async fn test_find_by_email_is_exact() {
        let repo = repo().await;

        let mary = repo
            .find_by_email("mary.smith@sakilacustomer.org")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mary.customer_id, 1);
        assert_eq!(mary.full_name(), "MARY SMITH");

        let upper = repo
            .find_by_email("MARY.SMITH@sakilacustomer.org")
            .await
            .unwrap();
        assert!(upper.is_none());
    }

    #[tokio::test]
    async fn test_resolve_existing_creates_nothing() {
        let repo = repo().await;

        let customer = repo
            .resolve_or_create("mary.smith@sakilacustomer.org", Some("Other"), None)
            .await
            .unwrap();

        assert_eq!(customer.customer_id, 1);
        assert_eq!(customer.first_name, "MARY");
        assert_eq!(repo.count().await.unwrap(), CUSTOMER_COUNT);
    }

    #[tokio::test]
    async fn test_resolve_new_without_first_name() {
        let repo = repo().await;

        let err = repo
            .resolve_or_create("new@example.com", Some(""), Some("Doe"))
            .await
            .unwrap_err();

        match err {
            WorkflowError::Rule(CoreError::IncompleteCustomerInfo { email, missing }) => {
                assert_eq!(email, "new@example.com");
                assert_eq!(missing, vec!["first_name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), CUSTOMER_COUNT);
    }

    #[tokio::test]
    async fn test_resolve_new_creates_once() {
        let repo = repo().await;

        let created = repo
            .resolve_or_create(" new@example.com ", Some(" Jane "), Some("Doe"))
            .await
            .unwrap();
        assert_eq!(created.email.as_deref(), Some("new@example.com"));
        assert_eq!(created.first_name, "Jane");
        assert!(created.active);
        assert_eq!(created.address_id, 1);
        assert_eq!(repo.count().await.unwrap(), CUSTOMER_COUNT + 1);

        let again = repo
            .resolve_or_create("new@example.com", None, None)
            .await
            .unwrap();
        assert_eq!(again.customer_id, created.customer_id);
        assert_eq!(repo.count().await.unwrap(), CUSTOMER_COUNT + 1);
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_email() {
        let repo = repo().await;

        let err = repo
            .resolve_or_create("not-an-email", Some("Jane"), Some("Doe"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Rule(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_resolve_without_any_address() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        fixtures::apply_schema(&db).await.unwrap();

        let err = db
            .customers()
            .resolve_or_create("new@example.com", Some("Jane"), Some("Doe"))
            .await
            .unwrap_err();
        match err {
            WorkflowError::Storage(DbError::NotFound { entity, .. }) => assert_eq!(entity, "Address"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_customer() {
        let repo = repo().await;

        let update = CustomerUpdate {
            last_name: Some("SMYTHE".to_string()),
            active: Some(false),
            ..Default::default()
        };
        let updated = repo.update(1, &update).await.unwrap();
        assert_eq!(updated.last_name, "SMYTHE");
        assert!(!updated.active);

        let stored = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = repo().await;

        let update = CustomerUpdate {
            email: Some("patricia.smith@sakilacustomer.org".to_string()),
            ..Default::default()
        };
        let err = repo.update(1, &update).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Rule(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        let missing = repo.update(9999, &update).await.unwrap_err();
        assert!(matches!(missing, WorkflowError::Storage(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_customer() {
        let repo = repo().await;

        let created = repo
            .resolve_or_create("gone@example.com", Some("Gone"), Some("Soon"))
            .await
            .unwrap();
        repo.delete(created.customer_id).await.unwrap();
        assert!(repo.get_by_id(created.customer_id).await.unwrap().is_none());

        let again = repo.delete(created.customer_id).await.unwrap_err();
        assert!(matches!(again, DbError::NotFound { .. }));

        let referenced = repo.delete(CUSTOMER_WITH_OPEN_RENTAL).await.unwrap_err();
        assert!(matches!(referenced, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_numeric_term_matches_id() {
        let repo = repo().await;
        let term = SearchTerm::parse("42");

        let page = repo
            .search_customers(&PageRequest::default(), term.as_ref())
            .await
            .unwrap();

        assert!(page.rows.iter().any(|c| c.customer_id == 42));
        assert_eq!(page.total, page.rows.len() as i64);
    }

    #[tokio::test]
    async fn test_search_second_page_unfiltered() {
        let repo = repo().await;

        let everyone = repo
            .search_customers(&PageRequest::new(1, 100), None)
            .await
            .unwrap();
        let page = repo
            .search_customers(&PageRequest::new(2, 10), None)
            .await
            .unwrap();

        assert_eq!(page.total, CUSTOMER_COUNT);
        assert_eq!(page.total_pages, (CUSTOMER_COUNT + 9) / 10);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows.as_slice(), &everyone.rows[10..20]);

        let keys: Vec<_> = everyone
            .rows
            .iter()
            .map(|c| (c.last_name.clone(), c.first_name.clone(), c.customer_id))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[tokio::test]
    async fn test_search_names_case_insensitive() {
        let repo = repo().await;

        let smiths = repo
            .search_customers(&PageRequest::default(), SearchTerm::parse("smi").as_ref())
            .await
            .unwrap();
        assert_eq!(smiths.total, 12);
        assert!(smiths.rows.iter().all(|c| c.last_name == "SMITH"));

        let full = repo
            .search_customers(&PageRequest::default(), SearchTerm::parse("Mary Smith").as_ref())
            .await
            .unwrap();
        assert_eq!(full.total, 1);
        assert_eq!(full.rows[0].customer_id, 1);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let repo = repo().await;

        let page = repo
            .search_customers(&PageRequest::default(), SearchTerm::parse("%").as_ref())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_search_non_ascii_name() {
        let repo = repo().await;
        let created = repo
            .resolve_or_create("emile.zola@example.com", Some("ÉMILE"), Some("ZOLA"))
            .await
            .unwrap();

        for text in ["ÉMILE", "Émile", "ÉMILE ZOLA", "mile zo"] {
            let page = repo
                .search_customers(&PageRequest::default(), SearchTerm::parse(text).as_ref())
                .await
                .unwrap();
            assert_eq!(page.total, 1, "search {text:?}");
            assert_eq!(page.rows[0].customer_id, created.customer_id);
        }
    }

    fn remove_database_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    async fn file_database(path: &std::path::Path) -> Database {
        remove_database_files(path);
        let db = Database::new(
            DbConfig::new(path)
                .create_if_missing(true)
                .max_connections(8),
        )
        .await
        .unwrap();
        fixtures::apply_schema(&db).await.unwrap();
        fixtures::seed_demo_data(&db).await.unwrap();
        db
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolves_create_one_customer() {
        let path = std::env::temp_dir().join(format!("reel-db-resolve-{}.db", std::process::id()));
        let db = file_database(&path).await;

        for n in 0..10 {
            let email = format!("walk.in.{n}@example.com");
            let tasks: Vec<_> = (0..2)
                .map(|_| {
                    let repo = db.customers();
                    let email = email.clone();
                    tokio::spawn(async move {
                        repo.resolve_or_create(&email, Some("WALK"), Some("IN")).await
                    })
                })
                .collect();

            let mut ids = Vec::new();
            for task in tasks {
                ids.push(task.await.unwrap().unwrap().customer_id);
            }
            assert_eq!(ids[0], ids[1]);

            let rows = db
                .gateway()
                .fetch_count(
                    &Statement::new("SELECT COUNT(*) FROM customer WHERE email = ?")
                        .bind(email.as_str()),
                )
                .await
                .unwrap();
            assert_eq!(rows, 1, "{email}");
        }
        assert_eq!(db.customers().count().await.unwrap(), CUSTOMER_COUNT + 10);

        db.close().await;
        remove_database_files(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_to_one_email() {
        let path = std::env::temp_dir().join(format!("reel-db-update-{}.db", std::process::id()));
        let db = file_database(&path).await;

        let tasks: Vec<_> = [1_i64, 2]
            .into_iter()
            .map(|customer_id| {
                let repo = db.customers();
                tokio::spawn(async move {
                    let update = CustomerUpdate {
                        email: Some("shared@example.com".to_string()),
                        ..Default::default()
                    };
                    repo.update(customer_id, &update).await
                })
            })
            .collect();

        let mut updated = 0;
        let mut refused = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => updated += 1,
                Err(WorkflowError::Rule(CoreError::Validation(ValidationError::Duplicate {
                    ..
                }))) => refused += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!((updated, refused), (1, 1));

        let owners = db
            .gateway()
            .fetch_count(
                &Statement::new("SELECT COUNT(*) FROM customer WHERE email = ?")
                    .bind("shared@example.com"),
            )
            .await
            .unwrap();
        assert_eq!(owners, 1);

        db.close().await;
        remove_database_files(&path);
    }
}
