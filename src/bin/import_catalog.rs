//! Utility to load a JSON catalog export into the database
//!
//! Usage: import_catalog <catalog.json>

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pcm=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let Some(file_path) = std::env::args().nth(1) else {
        eprintln!("Usage: import_catalog <catalog.json>");
        std::process::exit(2);
    };

    let db_path = pcm::config::database_path();
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = pcm::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        pcm::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let summary = pcm::tools::catalog::import_catalog_file(&database, &file_path)?;

    println!("Catalog imported from {}:", file_path);
    println!("  Materials: {} ({} without dk_id)", summary.materials_imported, summary.materials_without_id);
    println!("  Products:  {} ({} recipe lines dropped)", summary.products_imported, summary.recipe_lines_dropped);
    println!("  Skipped:   {}", summary.skipped);
    for error in &summary.errors {
        println!("    {}", error);
    }

    Ok(())
}
