pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::ledger::BookingLedger;
use store::PgInventoryStore;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub ledger: BookingLedger,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let ledger = BookingLedger::new(Arc::new(PgInventoryStore::new(db.pool.clone())));

        Ok(Arc::new(Self { db, ledger, config }))
    }
}
