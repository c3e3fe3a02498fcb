//! Libris bootstrap binary.
//!
//! Loads configuration, initializes tracing, brings the catalog up from the
//! latest snapshot (seeding demonstration data on first run) and writes a
//! fresh snapshot back. Interactive front ends drive the same library API.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris::{AppConfig, Catalog, SnapshotStore};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris v{}", env!("CARGO_PKG_VERSION"));

    let mut catalog = Catalog::new(&config.library.name, &config.library.location);
    let store = SnapshotStore::from_config(&config.storage);

    if store.load_snapshot(&mut catalog).is_err() {
        tracing::warn!("no usable snapshot found, seeding demonstration catalog");
        catalog.seed_sample_catalog();
    }

    tracing::info!(
        name = catalog.name(),
        location = catalog.location(),
        total = catalog.total_items(),
        available = catalog.available_items(),
        borrowers = catalog.borrowers().len(),
        "catalog ready"
    );
    for (category, count) in catalog.category_counts() {
        tracing::info!(category = %category, count, "category");
    }

    store.save_snapshot(&catalog)?;

    Ok(())
}
