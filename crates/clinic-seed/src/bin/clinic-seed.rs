//! Command-line entry point: seed a clinic database with fixture data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clinic_core::Database;
use clinic_seed::{SeedConfig, Seeder};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clinic-seed", version, about = "Populate a clinic database with test data")]
struct Cli {
    /// SQLite database file, created if missing
    #[arg(long, default_value = "clinic.db")]
    database: PathBuf,

    /// JSON seeding configuration; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    doctors: Option<usize>,

    #[arg(long)]
    patients: Option<usize>,

    #[arg(long)]
    visits: Option<usize>,

    /// Print the summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SeedConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SeedConfig::default(),
    };
    if let Some(doctors) = cli.doctors {
        config.doctors = doctors;
    }
    if let Some(patients) = cli.patients {
        config.patients = patients;
    }
    if let Some(visits) = cli.visits {
        config.visits = visits;
    }
    config.validate().context("invalid seeding configuration")?;

    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, database = %cli.database.display(), "opening database");

    let db = Database::open(&cli.database)
        .with_context(|| format!("opening database {}", cli.database.display()))?;

    let mut seeder = Seeder::seeded(db, config, seed);
    let summary = seeder.seed().context("seeding aborted")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
        println!("seed: {}", seed);
    }
    Ok(())
}
