//! Bulk-import ingredients from a JSON file into the catalogue.
//!
//! The input is a JSON array of `{"name": ..., "measurement_unit": ...}`
//! objects. The import runs in one transaction; a duplicate name and unit
//! pair aborts the whole batch and exits non-zero.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use potluck::domain::ports::{CatalogueRepository, NewIngredient};
use potluck::outbound::persistence::{DbPool, DieselCatalogueRepository, PoolConfig};
use tokio::runtime::Builder;

/// `import-ingredients` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-ingredients",
    about = "Bulk-import recipe ingredients from a JSON file",
    version
)]
struct CliArgs {
    /// Path to a JSON array of `{name, measurement_unit}` objects.
    #[arg(long = "file", value_name = "path")]
    file: PathBuf,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let rows = read_rows(&args.file)?;
    let database_url = resolve_database_url(args.database_url)?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let repository = DieselCatalogueRepository::new(pool);

    let imported = repository
        .import_ingredients(&rows)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("imported {imported} ingredients");
    Ok(())
}

fn read_rows(path: &Path) -> io::Result<Vec<NewIngredient>> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        io::Error::other(format!("read input file '{}': {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        io::Error::other(format!("parse input file '{}': {error}", path.display()))
    })
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })
}
