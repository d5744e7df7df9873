//! # Seed Data Generator
//!
//! Populates the database with test catalog entries for development.
//!
//! ## Usage
//! ```bash
//! # Generate the full built-in catalog (default)
//! cargo run -p replay-db --bin seed
//!
//! # Generate a custom amount
//! cargo run -p replay-db --bin seed -- --count 40
//!
//! # Specify database path
//! cargo run -p replay-db --bin seed -- --db ./data/replay.db
//! ```
//!
//! ## Generated SKUs
//! Each entry gets:
//! - A 13-digit barcode derived from its index
//! - A platform-prefixed title ("SNES Chrono Trigger", ...)
//! - List price spread between $19.99 and $149.99
//! - Stock split across the two variants (0-6 boxed, 0-4 loose)
//! - A cost basis at 45-65% of list

use chrono::Utc;
use std::env;
use replay_core::Sku;
use replay_db::{Database, DbConfig};

/// Platform / title pools for realistic test data
const PLATFORMS: &[(&str, &[&str])] = &[
    (
        "SNES",
        &[
            "Chrono Trigger",
            "Super Metroid",
            "EarthBound",
            "Super Mario World",
            "Zelda Link to the Past",
            "Final Fantasy VI",
            "Donkey Kong Country",
            "Mega Man X",
            "Star Fox",
            "F-Zero",
        ],
    ),
    (
        "N64",
        &[
            "Ocarina of Time",
            "Majoras Mask",
            "Super Mario 64",
            "GoldenEye 007",
            "Banjo-Kazooie",
            "Paper Mario",
            "Star Fox 64",
            "Mario Kart 64",
            "Smash Bros",
            "Conkers Bad Fur Day",
        ],
    ),
    (
        "GBA",
        &[
            "Pokemon Emerald",
            "Pokemon FireRed",
            "Metroid Fusion",
            "Golden Sun",
            "Fire Emblem",
            "Minish Cap",
            "Mario & Luigi",
            "Advance Wars",
            "Castlevania Aria",
            "Mother 3",
        ],
    ),
    (
        "PS2",
        &[
            "Shadow of the Colossus",
            "Okami",
            "Persona 4",
            "Metal Gear Solid 3",
            "God of War II",
            "Kingdom Hearts II",
            "Final Fantasy X",
            "Gran Turismo 4",
            "Ico",
            "Silent Hill 2",
        ],
    ),
    (
        "GC",
        &[
            "Wind Waker",
            "Metroid Prime",
            "Melee",
            "Paper Mario TTYD",
            "Pikmin 2",
            "F-Zero GX",
            "Luigis Mansion",
            "Double Dash",
            "Fire Emblem PoR",
            "Eternal Darkness",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./replay_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Replay Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Max catalog entries to generate (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./replay_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Replay Ledger Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database (migrations run on construction)
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing catalog
    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} SKUs", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (platform_idx, (platform, titles)) in PLATFORMS.iter().enumerate() {
        for (title_idx, title) in titles.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let sku = generate_sku(platform, title, platform_idx * 100 + title_idx);

            if let Err(e) = db.catalog().insert(&sku).await {
                eprintln!("Failed to insert {}: {}", sku.barcode, e);
                continue;
            }

            generated += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} SKUs in {:?}", generated, elapsed);

    let active = db.catalog().count().await?;
    println!("  Active SKUs: {}", active);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single catalog entry with realistic data.
fn generate_sku(platform: &str, title: &str, seed: usize) -> Sku {
    let now = Utc::now();

    // 13-digit barcode derived from the index (not a valid EAN checksum)
    let barcode = format!("045{:010}", seed);

    // List price: $19.99 - $149.99, skewed by the index
    let list_price_cents = 1999 + ((seed * 37) % 13000) as i64;

    // Cost basis at 45-65% of list
    let cost_pct = 45 + (seed % 20) as i64;
    let cost_basis_cents = list_price_cents * cost_pct / 100;

    // Every fifth entry runs a promo at 80% of list
    let sale_active = seed % 5 == 0;
    let sale_price_cents = sale_active.then_some(list_price_cents * 80 / 100);

    Sku {
        barcode,
        title: format!("{} {}", platform, title),
        stock_with_case: (seed % 7) as i64,
        stock_cartridge_only: (seed % 5) as i64,
        cost_basis_cents,
        list_price_cents,
        sale_active,
        sale_price_cents,
        units_sold: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}
