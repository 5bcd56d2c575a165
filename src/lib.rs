// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod allergen;
pub mod api;
pub mod catalog;
pub mod engine;
pub mod flags;
pub mod matcher;
pub mod normalize;
pub mod risk;

// ---- Re-exports for stable public API ----
pub use crate::allergen::{AllergenCategory, Severity};
pub use crate::api::{create_router, AppState};
pub use crate::catalog::{CatalogHandle, DietaryFlag, RuleCatalog};
pub use crate::engine::{classify, ClassificationResult, DetectedAllergen};
pub use crate::flags::DietaryFlags;
pub use crate::risk::RiskLevel;
