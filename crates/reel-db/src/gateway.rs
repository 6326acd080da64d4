//! # Query Gateway
//!
//! The one path from repository code to the store.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Statement { sql: "... WHERE customer_id = ?1 LIMIT ?2 OFFSET ?3",     │
//! │              params: [Int(42), Int(20), Int(0)] }                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bind every param in order (text, integers, timestamps alike)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  executor = &SqlitePool            (QueryGateway methods)              │
//! │           | &mut SqliteConnection  (inside a transaction)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(rows) | Err(DbError)  ← driver message preserved, no retries       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here formats a value into SQL text. Statement text is always a
//! fixed string chosen by the caller; values only ever travel in `params`.

use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Statement
// =============================================================================

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlParam::Null, Into::into)
    }
}

/// SQL text plus its positional parameters.
///
/// ## Example
/// ```rust
/// use reel_db::gateway::{SqlParam, Statement};
///
/// let stmt = Statement::new("SELECT * FROM customer WHERE customer_id = ?1").bind(42_i64);
/// assert_eq!(stmt.params(), &[SqlParam::Int(42)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlParam>,
}

impl Statement {
    /// Creates a statement with no parameters yet.
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends the next positional parameter.
    pub fn bind(mut self, value: impl Into<SqlParam>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Builds a sqlx query with every parameter bound.
    fn to_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
                SqlParam::Bool(v) => query.bind(*v),
                SqlParam::Timestamp(v) => query.bind(*v),
                SqlParam::Null => query.bind(None::<i64>),
            };
        }
        query
    }
}

// =============================================================================
// Executor-generic operations
// =============================================================================

/// Runs a statement that returns no rows. Returns the affected row count.
pub async fn execute<'c, E>(executor: E, statement: &Statement) -> DbResult<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(sql = %statement.sql(), params = statement.params().len(), "execute");
    let result = statement.to_query().execute(executor).await?;
    Ok(result.rows_affected())
}

/// Runs a query and returns every row, in store order.
pub async fn fetch_rows<'c, E>(executor: E, statement: &Statement) -> DbResult<Vec<SqliteRow>>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(sql = %statement.sql(), params = statement.params().len(), "fetch_rows");
    let rows = statement.to_query().fetch_all(executor).await?;
    Ok(rows)
}

/// Runs a query and maps every row to `T`.
pub async fn fetch_all_as<'c, E, T>(executor: E, statement: &Statement) -> DbResult<Vec<T>>
where
    E: Executor<'c, Database = Sqlite>,
    T: for<'r> FromRow<'r, SqliteRow>,
{
    let rows = fetch_rows(executor, statement).await?;
    let mapped = rows
        .iter()
        .map(|row| T::from_row(row))
        .collect::<Result<Vec<T>, sqlx::Error>>()?;
    Ok(mapped)
}

/// Runs a query and maps the first row, if any, to `T`.
pub async fn fetch_optional_as<'c, E, T>(executor: E, statement: &Statement) -> DbResult<Option<T>>
where
    E: Executor<'c, Database = Sqlite>,
    T: for<'r> FromRow<'r, SqliteRow>,
{
    debug!(sql = %statement.sql(), params = statement.params().len(), "fetch_optional");
    let row = statement.to_query().fetch_optional(executor).await?;
    let mapped = row.as_ref().map(|row| T::from_row(row)).transpose()?;
    Ok(mapped)
}

/// Runs a `SELECT COUNT(*) ...` style query and returns the first column.
pub async fn fetch_count<'c, E>(executor: E, statement: &Statement) -> DbResult<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    use sqlx::Row;

    debug!(sql = %statement.sql(), params = statement.params().len(), "fetch_count");
    let row = statement.to_query().fetch_one(executor).await?;
    let count: i64 = row.try_get(0)?;
    Ok(count)
}

// =============================================================================
// QueryGateway
// =============================================================================

/// Pool-backed gateway handed to every repository.
///
/// For work inside a transaction, call the free functions of this module
/// with `&mut *tx` instead.
#[derive(Debug, Clone)]
pub struct QueryGateway {
    pool: SqlitePool,
}

impl QueryGateway {
    /// Creates a gateway over an injected pool.
    pub fn new(pool: SqlitePool) -> Self {
        QueryGateway { pool }
    }

    /// Starts a transaction on a pooled connection.
    ///
    /// The transaction is deferred: it becomes a writer, and takes SQLite's
    /// write lock, at its first write statement.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn execute(&self, statement: &Statement) -> DbResult<u64> {
        execute(&self.pool, statement).await
    }

    pub async fn fetch_rows(&self, statement: &Statement) -> DbResult<Vec<SqliteRow>> {
        fetch_rows(&self.pool, statement).await
    }

    pub async fn fetch_all_as<T>(&self, statement: &Statement) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        fetch_all_as(&self.pool, statement).await
    }

    pub async fn fetch_optional_as<T>(&self, statement: &Statement) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        fetch_optional_as(&self.pool, statement).await
    }

    pub async fn fetch_count(&self, statement: &Statement) -> DbResult<i64> {
        fetch_count(&self.pool, statement).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use sqlx::Row;

    async fn gateway() -> QueryGateway {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gw = db.gateway();
        gw.execute(&Statement::new(
            "CREATE TABLE note (id INTEGER PRIMARY KEY, body TEXT, flag BOOLEAN, at TEXT)",
        ))
        .await
        .unwrap();
        gw
    }

    #[test]
    fn test_statement_builder() {
        let stmt = Statement::new("SELECT ?1, ?2, ?3")
            .bind(7_i64)
            .bind("x")
            .bind(None::<String>);
        assert_eq!(stmt.sql(), "SELECT ?1, ?2, ?3");
        assert_eq!(
            stmt.params(),
            &[
                SqlParam::Int(7),
                SqlParam::Text("x".to_string()),
                SqlParam::Null
            ]
        );
    }

    #[tokio::test]
    async fn test_bound_values_round_trip_through_the_store() {
        let gw = gateway().await;
        let now = Utc::now();

        let inserted = gw
            .execute(
                &Statement::new("INSERT INTO note (body, flag, at) VALUES (?1, ?2, ?3)")
                    .bind("it's; DROP TABLE note; --")
                    .bind(true)
                    .bind(now),
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = gw
            .fetch_rows(&Statement::new("SELECT body, flag, at FROM note WHERE id = ?1").bind(1_i64))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let body: String = rows[0].get("body");
        let flag: bool = rows[0].get("flag");
        let at: DateTime<Utc> = rows[0].get("at");
        assert_eq!(body, "it's; DROP TABLE note; --");
        assert!(flag);
        assert_eq!(at, now);

        let count = gw
            .fetch_count(&Statement::new("SELECT COUNT(*) FROM note"))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_carries_driver_message() {
        let gw = gateway().await;
        let Err(err) = gw
            .fetch_rows(&Statement::new("SELECT * FROM no_such_table"))
            .await
        else {
            panic!("query against a missing table returned rows");
        };

        match err {
            DbError::QueryFailed(msg) => assert!(msg.contains("no_such_table")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
