//! # Demo Database Generator
//!
//! Creates a SQLite file with the fixture schema and fills it with demo
//! films, actors, customers and rentals for local development.
//!
//! ## Usage
//! ```bash
//! # Create ./sakila.db (default)
//! cargo run -p reel-db --features fixtures --bin seed
//!
//! # Specify database path
//! cargo run -p reel-db --features fixtures --bin seed -- --db ./data/sakila.db
//! ```
//!
//! An existing database that already has customers is left untouched.

use std::env;

use reel_core::{PageRequest, SearchTerm};
use reel_db::fixtures::{apply_schema, seed_demo_data};
use reel_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./sakila.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Reel Rentals Demo Database Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./sakila.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🎬 Reel Rentals Demo Database Generator");
    println!("=======================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database, creating the file if needed
    let config = DbConfig::new(&db_path).create_if_missing(true);
    let db = Database::new(config).await?;
    println!("✓ Connected to database");

    apply_schema(&db).await?;
    println!("✓ Schema applied");

    // Check existing customers
    let existing = db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating demo data...");
    let start = std::time::Instant::now();
    let counts = seed_demo_data(&db).await?;
    let elapsed = start.elapsed();

    println!();
    println!("✓ Seeded in {:?}", elapsed);
    println!("  Addresses: {}", counts.addresses);
    println!("  Films:     {} ({} copies)", counts.films, counts.inventory);
    println!("  Actors:    {}", counts.actors);
    println!("  Customers: {}", counts.customers);
    println!("  Rentals:   {}", counts.rentals);

    // Verify the read paths
    println!();
    println!("Verifying queries...");
    let top = db.catalog().top_rented_films().await?;
    println!("  Top rented films: {}", top.len());

    let smiths = db
        .customers()
        .search_customers(&PageRequest::default(), SearchTerm::parse("smith").as_ref())
        .await?;
    println!("  Search 'smith': {} customers", smiths.total);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
