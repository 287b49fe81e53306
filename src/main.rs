//! Church ledger HTTP server.

use std::sync::Arc;

use tracing::{error, info};

use church_ledger::api::{AppState, create_router};
use church_ledger::config::ConfigLoader;
use church_ledger::services::{CatalogService, ExpenseService};
use church_ledger::store::{EntityStore, InMemoryStore};
use church_ledger::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = ConfigLoader::from_env()?;
    telemetry::init(&config.settings().logging)?;

    let store: Arc<dyn EntityStore> = Arc::new(InMemoryStore::new());
    let summary = config.apply_seed(
        &CatalogService::new(store.clone()),
        &ExpenseService::new(store.clone()),
    )?;
    info!(
        employees = summary.employees,
        categories = summary.categories,
        "Store ready"
    );

    let addr = config.settings().server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Church ledger listening");

    if let Err(err) = axum::serve(listener, create_router(AppState::new(store))).await {
        error!(error = %err, "Server stopped");
        return Err(err.into());
    }
    Ok(())
}
