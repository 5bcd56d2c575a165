//! Risk scorer and recommender.
//!
//! Maps the aggregated allergen set to a three-tier risk level plus
//! templated, deterministic recommendation lines. "Confirmed clear" reports
//! as LOW rather than a separate tier, keeping the type three-valued for
//! consumers.

use serde::{Deserialize, Serialize};

use crate::allergen::{AllergenCategory, Severity};

/// Distinct-category count at which risk escalates to HIGH regardless of
/// individual severities.
const HIGH_CATEGORY_COUNT: usize = 3;

const GENERAL_CAUTION: &str =
    "High allergen risk: review every ingredient with staff before ordering.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Score the aggregated `(category, severity)` set.
///
/// HIGH: any high-severity category, or `HIGH_CATEGORY_COUNT`+ distinct
/// categories. MEDIUM: highest severity present is medium. LOW: otherwise,
/// including no allergens at all.
pub fn score(allergens: &[(AllergenCategory, Severity)]) -> (RiskLevel, Vec<String>) {
    let max_severity = allergens.iter().map(|(_, s)| *s).max();

    let level = match max_severity {
        _ if allergens.len() >= HIGH_CATEGORY_COUNT => RiskLevel::High,
        Some(Severity::High) => RiskLevel::High,
        Some(Severity::Medium) => RiskLevel::Medium,
        Some(Severity::Low) | None => RiskLevel::Low,
    };

    let mut recommendations = Vec::with_capacity(allergens.len() + 1);
    if level == RiskLevel::High {
        recommendations.push(GENERAL_CAUTION.to_string());
    }
    for (category, _) in allergens {
        recommendations.push(format!(
            "Confirm with staff whether the {} can be omitted.",
            category.label()
        ));
    }

    (level, recommendations)
}
