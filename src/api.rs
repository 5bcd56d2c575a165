//! HTTP surface: thin axum layer over the classification engine.
//!
//! The engine itself is pure; everything stateful lives in `AppState`
//! (the shared catalog handle and the rule-file path used by explicit
//! reloads).

use std::path::PathBuf;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::catalog::{default_rules_path, CatalogHandle};
use crate::engine::{classify, ClassificationResult};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogHandle,
    pub rules_path: PathBuf,
}

impl AppState {
    pub fn new(catalog: CatalogHandle) -> Self {
        Self {
            catalog,
            rules_path: default_rules_path(),
        }
    }

    pub fn with_rules_path(catalog: CatalogHandle, rules_path: PathBuf) -> Self {
        Self {
            catalog,
            rules_path,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classify", post(classify_dish))
        .route("/admin/reload-rules", post(admin_reload_rules))
        .route("/debug/catalog", get(debug_catalog))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// Dev logging gate: ALLERGY_DEV_LOG=1 AND dev env (debug or APP_ENV in {local,development,dev})
fn dev_logging_enabled() -> bool {
    let on = std::env::var("ALLERGY_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger. Never logs raw ingredient text, only a
/// short hash plus aggregate counts.
fn dev_log_classification(ingredients: &[String], result: &ClassificationResult) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&ingredients.join("\n"));
    info!(
        target: "classify",
        %id,
        ingredients = ingredients.len(),
        allergens = result.allergens.len(),
        risk = ?result.risk_level,
    );
}

#[derive(serde::Deserialize)]
struct ClassifyReq {
    ingredients: Vec<String>,
}

async fn classify_dish(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> Json<ClassificationResult> {
    // Snapshot once; a concurrent reload cannot affect this call.
    let catalog = state.catalog.current();
    let result = classify(&body.ingredients, &catalog);
    dev_log_classification(&body.ingredients, &result);
    Json(result)
}

#[derive(serde::Serialize)]
struct ReloadResp {
    status: &'static str,
    version: Option<String>,
    error: Option<String>,
}

async fn admin_reload_rules(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReloadResp>) {
    match state.catalog.reload_from(&state.rules_path) {
        Ok(version) => (
            StatusCode::OK,
            Json(ReloadResp {
                status: "reloaded",
                version: Some(version),
                error: None,
            }),
        ),
        // Previous catalog stays active; report why the new one was refused.
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ReloadResp {
                status: "rejected",
                version: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}

#[derive(serde::Serialize)]
struct CatalogInfo {
    version: String,
    allergen_rules: usize,
    dietary_rules: usize,
}

async fn debug_catalog(State(state): State<AppState>) -> Json<CatalogInfo> {
    let catalog = state.catalog.current();
    Json(CatalogInfo {
        version: catalog.version.clone(),
        allergen_rules: catalog.allergen_rules().len(),
        dietary_rules: catalog.dietary_rules().len(),
    })
}
