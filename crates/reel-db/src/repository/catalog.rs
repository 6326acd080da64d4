//! # Catalog Repository
//!
//! Read-only film and actor queries behind the storefront pages.
//!
//! Category is joined with `LEFT JOIN`, so a film without a category row is
//! still listed (with `category = None`). Rental counts come from
//! `inventory ⋈ rental`.

use tracing::debug;

use reel_core::{Actor, ActorStats, Film, RankedFilm, SearchTerm};

use crate::error::DbResult;
use crate::gateway::{QueryGateway, Statement};

/// Rows in the "top" lists.
pub const TOP_LIMIT: i64 = 5;

/// Maximum rows returned by [`CatalogRepository::search_films`].
pub const FILM_SEARCH_LIMIT: i64 = 20;

const FILM_SELECT: &str = "\
    SELECT f.film_id, f.title, f.description, f.release_year, f.rating, f.length, \
           c.name AS category \
    FROM film f \
    LEFT JOIN film_category fc ON f.film_id = fc.film_id \
    LEFT JOIN category c ON fc.category_id = c.category_id";

const RANKED_FILM_SELECT: &str = "\
    SELECT f.film_id, f.title, f.description, f.release_year, f.rating, f.length, \
           c.name AS category, COUNT(r.rental_id) AS rental_count \
    FROM film f \
    LEFT JOIN film_category fc ON f.film_id = fc.film_id \
    LEFT JOIN category c ON fc.category_id = c.category_id \
    JOIN inventory i ON f.film_id = i.film_id \
    JOIN rental r ON i.inventory_id = r.inventory_id";

const RANKED_FILM_GROUP: &str = "\
    GROUP BY f.film_id, f.title, f.description, f.release_year, f.rating, f.length, c.name \
    ORDER BY rental_count DESC, f.title, f.film_id \
    LIMIT ?";

const ACTOR_STATS_SELECT: &str = "\
    SELECT a.actor_id, a.first_name || ' ' || a.last_name AS name, \
           COUNT(r.rental_id) AS total_rentals \
    FROM actor a \
    LEFT JOIN film_actor fa ON a.actor_id = fa.actor_id \
    LEFT JOIN inventory i ON fa.film_id = i.film_id \
    LEFT JOIN rental r ON i.inventory_id = r.inventory_id";

/// Repository for catalog reads.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    gateway: QueryGateway,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(gateway: QueryGateway) -> Self {
        CatalogRepository { gateway }
    }

    /// Every film, ordered by title.
    pub async fn list_films(&self) -> DbResult<Vec<Film>> {
        self.gateway
            .fetch_all_as(&Statement::new(format!(
                "{FILM_SELECT} ORDER BY f.title, f.film_id"
            )))
            .await
    }

    /// The most rented films.
    pub async fn top_rented_films(&self) -> DbResult<Vec<RankedFilm>> {
        self.gateway
            .fetch_all_as(
                &Statement::new(format!("{RANKED_FILM_SELECT} {RANKED_FILM_GROUP}"))
                    .bind(TOP_LIMIT),
            )
            .await
    }

    /// Films whose title contains `query`. Case folding covers ASCII letters
    /// only, like SQLite's `LOWER`.
    ///
    /// A blank query matches every title.
    pub async fn search_films(&self, query: &str) -> DbResult<Vec<Film>> {
        let pattern = SearchTerm::parse(query)
            .map(|term| term.like_pattern())
            .unwrap_or_else(|| "%".to_string());

        debug!(query = %query.trim(), "Searching films");

        self.gateway
            .fetch_all_as(
                &Statement::new(format!(
                    "{FILM_SELECT} WHERE LOWER(f.title) LIKE ? ESCAPE '\\' \
                     ORDER BY f.title, f.film_id LIMIT ?"
                ))
                .bind(pattern)
                .bind(FILM_SEARCH_LIMIT),
            )
            .await
    }

    /// One film with its category.
    pub async fn film_details(&self, film_id: i64) -> DbResult<Option<Film>> {
        self.gateway
            .fetch_optional_as(
                &Statement::new(format!("{FILM_SELECT} WHERE f.film_id = ?")).bind(film_id),
            )
            .await
    }

    /// Actors appearing in a film, ordered by name.
    pub async fn film_actors(&self, film_id: i64) -> DbResult<Vec<Actor>> {
        self.gateway
            .fetch_all_as(
                &Statement::new(
                    "SELECT a.actor_id, a.first_name || ' ' || a.last_name AS name \
                     FROM actor a \
                     JOIN film_actor fa ON a.actor_id = fa.actor_id \
                     WHERE fa.film_id = ? \
                     ORDER BY a.last_name, a.first_name, a.actor_id",
                )
                .bind(film_id),
            )
            .await
    }

    /// Actors whose films were rented the most.
    pub async fn top_actors(&self) -> DbResult<Vec<ActorStats>> {
        self.gateway
            .fetch_all_as(
                &Statement::new(format!(
                    "{ACTOR_STATS_SELECT} \
                     GROUP BY a.actor_id, a.first_name, a.last_name \
                     ORDER BY total_rentals DESC, a.actor_id \
                     LIMIT ?"
                ))
                .bind(TOP_LIMIT),
            )
            .await
    }

    /// One actor with the total rentals of their films.
    pub async fn actor_details(&self, actor_id: i64) -> DbResult<Option<ActorStats>> {
        self.gateway
            .fetch_optional_as(
                &Statement::new(format!(
                    "{ACTOR_STATS_SELECT} \
                     WHERE a.actor_id = ? \
                     GROUP BY a.actor_id, a.first_name, a.last_name"
                ))
                .bind(actor_id),
            )
            .await
    }

    /// An actor's most rented films.
    pub async fn actor_top_films(&self, actor_id: i64) -> DbResult<Vec<RankedFilm>> {
        self.gateway
            .fetch_all_as(
                &Statement::new(format!(
                    "{RANKED_FILM_SELECT} \
                     JOIN film_actor fa ON f.film_id = fa.film_id \
                     WHERE fa.actor_id = ? \
                     {RANKED_FILM_GROUP}"
                ))
                .bind(actor_id)
                .bind(TOP_LIMIT),
            )
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FILM_COUNT, FILM_WITHOUT_CATEGORY};

    async fn repo() -> CatalogRepository {
        fixtures::demo_database().await.unwrap().catalog()
    }

    #[tokio::test]
    async fn test_list_films_includes_uncategorized() {
        let repo = repo().await;
        let films = repo.list_films().await.unwrap();

        assert_eq!(films.len() as i64, FILM_COUNT);
        let titles: Vec<_> = films.iter().map(|f| f.title.clone()).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);

        let uncategorized = films
            .iter()
            .find(|f| f.film_id == FILM_WITHOUT_CATEGORY)
            .unwrap();
        assert_eq!(uncategorized.category, None);
    }

    #[tokio::test]
    async fn test_top_rented_films_are_ranked() {
        let repo = repo().await;
        let top = repo.top_rented_films().await.unwrap();

        assert!(!top.is_empty());
        assert!(top.len() as i64 <= TOP_LIMIT);
        assert!(top.windows(2).all(|w| w[0].rental_count >= w[1].rental_count));
    }

    #[tokio::test]
    async fn test_search_films() {
        let repo = repo().await;

        let hits = repo.search_films("air").await.unwrap();
        let titles: Vec<_> = hits.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["AFFAIR PREJUDICE", "AIRPLANE SIERRA", "AIRPORT POLLOCK"]
        );

        assert!(repo.search_films("zzz").await.unwrap().is_empty());
        assert!(repo.search_films("%").await.unwrap().is_empty());
        assert_eq!(repo.search_films("  ").await.unwrap().len() as i64, FILM_COUNT);
    }

    #[tokio::test]
    async fn test_search_films_non_ascii_title() {
        let repo = repo().await;
        repo.gateway
            .execute(&Statement::new("INSERT INTO film (title) VALUES (?)").bind("ÉTÉ INDIEN"))
            .await
            .unwrap();

        for query in ["ÉTÉ", "ÉtÉ IN", "indien"] {
            let hits = repo.search_films(query).await.unwrap();
            let titles: Vec<_> = hits.iter().map(|f| f.title.as_str()).collect();
            assert_eq!(titles, vec!["ÉTÉ INDIEN"], "search {query:?}");
        }
    }

    #[tokio::test]
    async fn test_film_details_and_actors() {
        let repo = repo().await;

        let film = repo.film_details(1).await.unwrap().unwrap();
        assert_eq!(film.title, "ACADEMY DINOSAUR");
        assert_eq!(film.category.as_deref(), Some("Documentary"));

        let actors = repo.film_actors(1).await.unwrap();
        assert!(actors.iter().any(|a| a.name == "PENELOPE GUINESS"));

        assert!(repo.film_details(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_actor_queries() {
        let repo = repo().await;

        let top = repo.top_actors().await.unwrap();
        assert_eq!(top.len() as i64, TOP_LIMIT);
        assert!(top.windows(2).all(|w| w[0].total_rentals >= w[1].total_rentals));

        let actor = repo.actor_details(1).await.unwrap().unwrap();
        assert_eq!(actor.name, "PENELOPE GUINESS");

        let films = repo.actor_top_films(1).await.unwrap();
        assert!(films.len() as i64 <= TOP_LIMIT);

        assert!(repo.actor_details(999).await.unwrap().is_none());
    }
}
