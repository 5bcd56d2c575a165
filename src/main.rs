//! Allergy Guard — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the rule catalog, shared state, and
//! middleware. The catalog must validate at startup; serving never begins
//! with a broken rule table.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use allergy_guard::api::{create_router, AppState};
use allergy_guard::catalog::{
    default_rules_path, start_hot_reload_thread, CatalogHandle, RuleCatalog,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("allergy_guard=info,classify=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // --- Load and validate the rule catalog (fatal on error) ---
    let path = default_rules_path();
    let catalog = RuleCatalog::from_path(&path)?;
    tracing::info!(
        version = %catalog.version,
        allergen_rules = catalog.allergen_rules().len(),
        path = %path.display(),
        "rule catalog loaded"
    );

    let handle = CatalogHandle::new(catalog);

    // If hot reload is enabled (dev only), spawn the background watcher.
    start_hot_reload_thread(handle.clone(), path.clone());

    let state = AppState::with_rules_path(handle, path);
    let router = create_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
