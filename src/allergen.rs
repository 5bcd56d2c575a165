//! Allergen category and severity primitives shared by the whole engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The 14 regulated allergen categories (EU labelling set).
///
/// The enum is closed: categories are never extended at runtime. Declaration
/// order is the canonical order used for `safe_categories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenCategory {
    Celery,
    GlutenCereals,
    Crustaceans,
    Eggs,
    Fish,
    Lupin,
    Milk,
    Molluscs,
    Mustard,
    Nuts,
    Peanuts,
    Sesame,
    Soya,
    Sulphites,
}

impl AllergenCategory {
    /// All categories in canonical declaration order.
    pub const ALL: [AllergenCategory; 14] = [
        AllergenCategory::Celery,
        AllergenCategory::GlutenCereals,
        AllergenCategory::Crustaceans,
        AllergenCategory::Eggs,
        AllergenCategory::Fish,
        AllergenCategory::Lupin,
        AllergenCategory::Milk,
        AllergenCategory::Molluscs,
        AllergenCategory::Mustard,
        AllergenCategory::Nuts,
        AllergenCategory::Peanuts,
        AllergenCategory::Sesame,
        AllergenCategory::Soya,
        AllergenCategory::Sulphites,
    ];

    /// Human-readable label used in recommendations and UI payloads.
    pub fn label(self) -> &'static str {
        match self {
            AllergenCategory::Celery => "Celery",
            AllergenCategory::GlutenCereals => "Gluten-Cereals",
            AllergenCategory::Crustaceans => "Crustaceans",
            AllergenCategory::Eggs => "Eggs",
            AllergenCategory::Fish => "Fish",
            AllergenCategory::Lupin => "Lupin",
            AllergenCategory::Milk => "Milk",
            AllergenCategory::Molluscs => "Molluscs",
            AllergenCategory::Mustard => "Mustard",
            AllergenCategory::Nuts => "Nuts",
            AllergenCategory::Peanuts => "Peanuts",
            AllergenCategory::Sesame => "Sesame",
            AllergenCategory::Soya => "Soya",
            AllergenCategory::Sulphites => "Sulphites",
        }
    }
}

impl fmt::Display for AllergenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule severity. When several rules for the same category match, the highest
/// severity wins; the derived `Ord` (Low < Medium < High) encodes that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::High.max(Severity::Low), Severity::High);
    }

    #[test]
    fn canonical_order_is_stable_and_complete() {
        assert_eq!(AllergenCategory::ALL.len(), 14);
        assert_eq!(AllergenCategory::ALL[0], AllergenCategory::Celery);
        assert_eq!(AllergenCategory::ALL[13], AllergenCategory::Sulphites);
    }

    #[test]
    fn serde_names_are_snake_case() {
        let json = serde_json::to_string(&AllergenCategory::GlutenCereals).unwrap();
        assert_eq!(json, "\"gluten_cereals\"");
        let back: AllergenCategory = serde_json::from_str("\"sulphites\"").unwrap();
        assert_eq!(back, AllergenCategory::Sulphites);
    }

    #[test]
    fn labels_match_regulated_names() {
        assert_eq!(AllergenCategory::GlutenCereals.label(), "Gluten-Cereals");
        assert_eq!(AllergenCategory::Milk.to_string(), "Milk");
    }
}
