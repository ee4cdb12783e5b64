//! Seeds a fresh database with the launch flavor catalog.
//!
//! Usage: `crumb-seed [path/to/crumb.db]` (defaults to ./crumb.db)

use std::path::PathBuf;

use tracing::{info, warn};

use crumb_core::types::Flavor;
use crumb_db::{Database, DbConfig, DbResult};

/// The six flavors the bakery launched with.
const LAUNCH_FLAVORS: [&str; 6] = [
    "Chips Chocolate Relleno Nutela",
    "Chips Chocolate Relleno Naranja",
    "Red Velvet Relleno Nutella",
    "M&m's Relleno Nutella",
    "Oreo Rellenor Oreo",
    "Oreo Rellenor Nutella",
];

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crumb.db"));

    info!(path = %path.display(), "Seeding database");
    let db = Database::new(DbConfig::new(path)).await?;

    let mut seeded = 0;
    for name in LAUNCH_FLAVORS {
        // Re-running the seeder must not duplicate the catalog.
        if db.flavors().get_by_name(name).await?.is_some() {
            warn!(flavor = name, "Already present, skipping");
            continue;
        }
        db.flavors().insert(&Flavor::new(name)).await?;
        seeded += 1;
    }

    info!(seeded, "Seed complete");
    db.close().await;
    Ok(())
}
