//! Dietary flag evaluator.
//!
//! Closed-world default: a dish satisfies a flag unless at least one
//! ingredient matches that flag's disqualifying set. The four flags are
//! computed independently; vegan ⇒ vegetarian holds only because the shipped
//! rule table makes the vegan set a superset of the vegetarian one (a data
//! property, covered by tests against the default catalog).

use serde::{Deserialize, Serialize};

use crate::catalog::{DietaryFlag, RuleCatalog};
use crate::matcher::matches_any_disqualifier;

/// The four boolean dietary attributes of a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryFlags {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
}

impl DietaryFlags {
    /// Vacuous satisfaction: an empty ingredient list disqualifies nothing.
    pub fn all_true() -> Self {
        Self {
            vegetarian: true,
            vegan: true,
            gluten_free: true,
            dairy_free: true,
        }
    }
}

/// Evaluate all four flags over the normalized ingredient list.
pub fn evaluate_flags(ingredients: &[Vec<String>], catalog: &RuleCatalog) -> DietaryFlags {
    let holds = |flag: DietaryFlag| -> bool {
        let disqualifiers = catalog.disqualifiers(flag);
        !ingredients
            .iter()
            .any(|tokens| matches_any_disqualifier(tokens, disqualifiers))
    };

    DietaryFlags {
        vegetarian: holds(DietaryFlag::Vegetarian),
        vegan: holds(DietaryFlag::Vegan),
        gluten_free: holds(DietaryFlag::GlutenFree),
        dairy_free: holds(DietaryFlag::DairyFree),
    }
}
