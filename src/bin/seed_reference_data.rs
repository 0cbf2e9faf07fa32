// ABOUTME: Reference data seeder for tags and ingredients
// ABOUTME: Loads JSON files into the database with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Reference data seeder for the Potluck server.
//!
//! Tags and ingredients are read-only over HTTP; this binary is their
//! write boundary. It loads JSON files and inserts each record through the
//! managers, so the same validation (unique fields, hex colors) applies.
//!
//! Usage:
//! ```bash
//! # Seed ingredients
//! cargo run --bin seed-reference-data -- --ingredients data/ingredients.json
//!
//! # Seed tags and ingredients together
//! cargo run --bin seed-reference-data -- --tags data/tags.json --ingredients data/ingredients.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use potluck_server::database::Database;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "seed-reference-data",
    about = "Potluck reference data seeder",
    long_about = "Load tag and ingredient reference data from JSON files"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// JSON file with tags: [{"name", "color", "slug"}]
    #[arg(long)]
    tags: Option<PathBuf>,

    /// JSON file with ingredients: [{"name", "measurement_unit"}]
    #[arg(long)]
    ingredients: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TagSeed {
    name: String,
    color: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    measurement_unit: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    potluck_server::logging::init_from_env()?;
    let args = SeedArgs::parse();

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:./data/potluck.db".to_owned());

    let database = Database::new(&database_url).await?;
    info!("Database initialized: {database_url}");

    if let Some(path) = args.tags {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let seeds: Vec<TagSeed> =
            serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let manager = database.tags();
        let mut loaded = 0usize;
        let mut skipped = 0usize;
        for seed in seeds {
            match manager.create(&seed.name, &seed.color, &seed.slug).await {
                Ok(_) => loaded += 1,
                Err(e) => {
                    warn!(tag = %seed.name, error = %e, "skipping tag");
                    skipped += 1;
                }
            }
        }
        info!(loaded, skipped, "tags seeded");
    }

    if let Some(path) = args.ingredients {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let seeds: Vec<IngredientSeed> =
            serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let manager = database.ingredients();
        let mut loaded = 0usize;
        for seed in seeds {
            manager.create(&seed.name, &seed.measurement_unit).await?;
            loaded += 1;
        }
        info!(loaded, "ingredients seeded");
    }

    Ok(())
}
