//! # Classification Engine
//! Pure, testable logic that maps an ingredient list + catalog snapshot →
//! `ClassificationResult`. No I/O, no locking, no failure mode: arbitrary
//! text degrades to "no finding", never to an error.
//!
//! Dataflow: normalize each ingredient → match against the catalog →
//! aggregate findings → (dietary flags, risk + recommendations) over the same
//! normalized set.

use serde::Serialize;

use crate::aggregate::{aggregate, safe_categories};
use crate::allergen::{AllergenCategory, Severity};
use crate::catalog::RuleCatalog;
use crate::flags::{evaluate_flags, DietaryFlags};
use crate::matcher::{find_allergens, AllergenFinding};
use crate::risk::{score, RiskLevel};

/// One input ingredient: raw text preserved for display, normalized tokens
/// derived for matching.
#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    pub raw: String,
    pub normalized: Vec<String>,
}

/// A detected category with its aggregated severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedAllergen {
    pub category: AllergenCategory,
    pub severity: Severity,
}

/// The sole artifact returned to callers; immutable once produced.
///
/// `safe_categories` means "not detected", not certified absent — surfacing
/// layers must state that caveat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub allergens: Vec<DetectedAllergen>,
    pub safe_categories: Vec<AllergenCategory>,
    pub dietary_flags: DietaryFlags,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

/// Classify an ordered ingredient list against one catalog snapshot.
///
/// Deterministic: the same inputs always produce a byte-identical result,
/// including ordering. Empty and whitespace-only strings normalize to empty
/// token sequences and contribute no findings.
pub fn classify(ingredients: &[String], catalog: &RuleCatalog) -> ClassificationResult {
    let normalized: Vec<Ingredient> = ingredients
        .iter()
        .map(|raw| Ingredient {
            raw: raw.clone(),
            normalized: catalog.normalizer.normalize(raw),
        })
        .collect();

    let mut findings: Vec<AllergenFinding> = Vec::new();
    for (index, ingredient) in normalized.iter().enumerate() {
        findings.extend(find_allergens(&ingredient.normalized, index, catalog));
    }

    let aggregated = aggregate(&findings);
    let token_lists: Vec<Vec<String>> = normalized.into_iter().map(|i| i.normalized).collect();
    let dietary_flags = evaluate_flags(&token_lists, catalog);
    let (risk_level, recommendations) = score(&aggregated);

    ClassificationResult {
        allergens: aggregated
            .iter()
            .map(|&(category, severity)| DetectedAllergen { category, severity })
            .collect(),
        safe_categories: safe_categories(&aggregated),
        dietary_flags,
        risk_level,
        recommendations,
    }
}
