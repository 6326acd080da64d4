//! # Fixture Schema and Demo Data
//!
//! The rental store's schema is owned outside this crate. This module ships
//! a SQLite rendition of it for tests, the `seed` binary and the API's
//! integration tests. It is compiled only for tests or with the `fixtures`
//! feature.
//!
//! ## Demo Data
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  addresses   3                                                          │
//! │  categories  6                                                          │
//! │  films       12   film 11 has no category, film 12 has no inventory    │
//! │  inventory   1-3 copies per film (film_id % 3 + 1)                     │
//! │  actors      8                                                          │
//! │  customers   60   customer 1 = MARY SMITH                              │
//! │  rentals     40 returned + 1 open (customer 3 holds film 3's only copy)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::DbResult;
use crate::gateway::{execute, Statement};
use crate::pool::{Database, DbConfig};

/// The fixture schema, SQLite dialect.
pub const SCHEMA_SQL: &str = include_str!("../fixtures/schema.sql");

/// Number of customers created by [`seed_demo_data`].
pub const CUSTOMER_COUNT: i64 = 60;

/// Number of films created by [`seed_demo_data`].
pub const FILM_COUNT: i64 = 12;

/// A film with no category row.
pub const FILM_WITHOUT_CATEGORY: i64 = 11;

/// A film with no inventory items.
pub const FILM_WITHOUT_INVENTORY: i64 = 12;

/// The customer holding the one open demo rental.
pub const CUSTOMER_WITH_OPEN_RENTAL: i64 = 3;

/// The film of the one open demo rental (it has a single copy).
pub const FILM_RENTED_OUT: i64 = 3;

const ADDRESSES: &[&str] = &["47 MySakila Drive", "28 MySQL Boulevard", "23 Workhaven Lane"];

const CATEGORIES: &[&str] = &["Action", "Animation", "Comedy", "Documentary", "Drama", "Family"];

/// (title, description, release year, rating, length, category index)
const FILMS: &[(&str, &str, i64, &str, i64, Option<usize>)] = &[
    ("ACADEMY DINOSAUR", "An Epic Drama of a Feminist And a Mad Scientist", 2006, "PG", 86, Some(3)),
    ("ACE GOLDFINGER", "An Astounding Epistle of a Database Administrator", 2006, "G", 48, Some(4)),
    ("ADAPTATION HOLES", "An Astounding Reflection of a Lumberjack And a Car", 2006, "NC-17", 50, Some(3)),
    ("AFFAIR PREJUDICE", "An Imaginative Documentary of a Frisbee And a Monkey", 2006, "G", 117, Some(1)),
    ("AFRICAN EGG", "A Fast-Paced Documentary of a Pastry Chef And a Dentist", 2006, "G", 130, Some(5)),
    ("AGENT TRUMAN", "An Intrepid Panorama of a Robot And a Boy", 2006, "PG", 169, Some(3)),
    ("AIRPLANE SIERRA", "A Touching Saga of a Hunter And a Butler", 2006, "PG-13", 62, Some(4)),
    ("AIRPORT POLLOCK", "An Epic Tale of a Moose And a Girl", 2006, "R", 54, Some(0)),
    ("ALABAMA DEVIL", "A Thoughtful Panorama of a Database Administrator", 2006, "PG-13", 114, Some(0)),
    ("ALADDIN CALENDAR", "An Action-Packed Tale of a Man And a Lumberjack", 2006, "NC-17", 63, Some(2)),
    ("ALAMO VIDEOTAPE", "A Boring Epistle of a Butler And a Cat", 2006, "G", 126, None),
    ("ALASKA PHANTOM", "A Fanciful Saga of a Hunter And a Pastry Chef", 2006, "PG", 136, Some(1)),
];

const ACTORS: &[(&str, &str)] = &[
    ("PENELOPE", "GUINESS"),
    ("NICK", "WAHLBERG"),
    ("ED", "CHASE"),
    ("JENNIFER", "DAVIS"),
    ("JOHNNY", "LOLLOBRIGIDA"),
    ("BETTE", "NICHOLSON"),
    ("GRACE", "MOSTEL"),
    ("MATTHEW", "JOHANSSON"),
];

const FIRST_NAMES: &[&str] = &[
    "MARY", "PATRICIA", "LINDA", "BARBARA", "ELIZABETH", "JENNIFER", "MARIA", "SUSAN", "MARGARET",
    "DOROTHY", "LISA", "NANCY",
];

const LAST_NAMES: &[&str] = &["SMITH", "JOHNSON", "WILLIAMS", "JONES", "BROWN"];

const HISTORICAL_RENTALS: i64 = 40;

/// Row counts written by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoData {
    pub addresses: usize,
    pub films: usize,
    pub inventory: usize,
    pub actors: usize,
    pub customers: usize,
    pub rentals: usize,
}

/// Creates the fixture tables. Safe to run more than once.
pub async fn apply_schema(db: &Database) -> DbResult<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(db.pool()).await?;
    info!("Fixture schema applied");
    Ok(())
}

/// Fills an empty fixture schema with the demo data set, in one transaction.
pub async fn seed_demo_data(db: &Database) -> DbResult<DemoData> {
    let mut tx = db.pool().begin().await?;
    let mut counts = DemoData::default();

    for address in ADDRESSES {
        execute(
            &mut *tx,
            &Statement::new("INSERT INTO address (address) VALUES (?)").bind(*address),
        )
        .await?;
        counts.addresses += 1;
    }

    for name in CATEGORIES {
        execute(
            &mut *tx,
            &Statement::new("INSERT INTO category (name) VALUES (?)").bind(*name),
        )
        .await?;
    }

    for (index, (title, description, year, rating, length, category)) in FILMS.iter().enumerate() {
        let film_id = index as i64 + 1;
        execute(
            &mut *tx,
            &Statement::new(
                "INSERT INTO film (film_id, title, description, release_year, rating, length) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(film_id)
            .bind(*title)
            .bind(*description)
            .bind(*year)
            .bind(*rating)
            .bind(*length),
        )
        .await?;
        counts.films += 1;

        if let Some(category) = category {
            execute(
                &mut *tx,
                &Statement::new("INSERT INTO film_category (film_id, category_id) VALUES (?, ?)")
                    .bind(film_id)
                    .bind(*category as i64 + 1),
            )
            .await?;
        }

        if film_id != FILM_WITHOUT_INVENTORY {
            for _ in 0..(film_id % 3 + 1) {
                execute(
                    &mut *tx,
                    &Statement::new("INSERT INTO inventory (film_id) VALUES (?)").bind(film_id),
                )
                .await?;
                counts.inventory += 1;
            }
        }
    }

    for (index, (first, last)) in ACTORS.iter().enumerate() {
        let actor_id = index as i64 + 1;
        execute(
            &mut *tx,
            &Statement::new("INSERT INTO actor (actor_id, first_name, last_name) VALUES (?, ?, ?)")
                .bind(actor_id)
                .bind(*first)
                .bind(*last),
        )
        .await?;
        counts.actors += 1;

        for film_id in 1..=FILM_COUNT {
            if film_id == actor_id || (film_id + actor_id) % 4 == 0 {
                execute(
                    &mut *tx,
                    &Statement::new("INSERT INTO film_actor (actor_id, film_id) VALUES (?, ?)")
                        .bind(actor_id)
                        .bind(film_id),
                )
                .await?;
            }
        }
    }

    for n in 0..CUSTOMER_COUNT as usize {
        let first = FIRST_NAMES[n % FIRST_NAMES.len()];
        let last = LAST_NAMES[n / FIRST_NAMES.len() % LAST_NAMES.len()];
        let email = format!("{first}.{last}@sakilacustomer.org").to_lowercase();
        execute(
            &mut *tx,
            &Statement::new(
                "INSERT INTO customer (first_name, last_name, email, address_id, active) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(first)
            .bind(last)
            .bind(email)
            .bind((n % ADDRESSES.len()) as i64 + 1)
            .bind(n % 17 != 16),
        )
        .await?;
        counts.customers += 1;
    }

    let inventory = counts.inventory as i64;
    let now = Utc::now();
    for k in 0..HISTORICAL_RENTALS {
        let rented_at = now - Duration::days(k + 10);
        execute(
            &mut *tx,
            &Statement::new(
                "INSERT INTO rental (rental_date, inventory_id, customer_id, return_date) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(rented_at)
            .bind(k * 7 % inventory + 1)
            .bind(k * 11 % CUSTOMER_COUNT + 1)
            .bind(rented_at + Duration::days(3)),
        )
        .await?;
        counts.rentals += 1;
    }

    execute(
        &mut *tx,
        &Statement::new(
            "INSERT INTO rental (rental_date, inventory_id, customer_id, return_date) \
             SELECT ?, inventory_id, ?, NULL FROM inventory WHERE film_id = ? \
             ORDER BY inventory_id LIMIT 1",
        )
        .bind(now - Duration::days(1))
        .bind(CUSTOMER_WITH_OPEN_RENTAL)
        .bind(FILM_RENTED_OUT),
    )
    .await?;
    counts.rentals += 1;

    tx.commit().await?;
    info!(?counts, "Demo data seeded");
    Ok(counts)
}

/// An in-memory database with the fixture schema and demo data.
pub async fn demo_database() -> DbResult<Database> {
    let db = Database::new(DbConfig::in_memory()).await?;
    apply_schema(&db).await?;
    seed_demo_data(&db).await?;
    Ok(db)
}

// =============================================================================
// Unit Tests
// =============================================================================
