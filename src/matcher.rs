//! Phrase matcher: applies the rule catalog to one normalized ingredient.
//!
//! Matching is exact against normalized tokens, on whole-token or contiguous
//! whole-phrase boundaries only. Substring containment is deliberately not
//! supported ("nutmeg" must never trigger a "nut" indicator), and there is no
//! fuzzy/edit-distance matching: a silent approximate match is worse than a
//! miss in an allergen-safety context. Unknown ingredients contribute no
//! findings.

use serde::Serialize;

use crate::allergen::{AllergenCategory, Severity};
use crate::catalog::{Phrase, RuleCatalog};

/// One ingredient×rule match, prior to aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllergenFinding {
    pub category: AllergenCategory,
    pub severity: Severity,
    pub matched_phrase: String,
    pub ingredient_index: usize,
}

/// True if `phrase` occurs in `tokens` as a contiguous whole-token run.
fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    match phrase.len() {
        0 => false,
        1 => tokens.iter().any(|t| *t == phrase[0]),
        n => tokens.windows(n).any(|w| w == phrase),
    }
}

/// Run every allergen rule against one normalized ingredient. At most one
/// finding per rule: the first indicator phrase that hits wins.
pub fn find_allergens(
    tokens: &[String],
    ingredient_index: usize,
    catalog: &RuleCatalog,
) -> Vec<AllergenFinding> {
    let mut findings = Vec::new();
    if tokens.is_empty() {
        return findings;
    }
    for rule in catalog.allergen_rules() {
        if let Some(p) = rule
            .phrases
            .iter()
            .find(|p| contains_phrase(tokens, &p.tokens))
        {
            findings.push(AllergenFinding {
                category: rule.category,
                severity: rule.severity,
                matched_phrase: p.display.clone(),
                ingredient_index,
            });
        }
    }
    findings
}

/// True if the ingredient matches any phrase in a disqualifying set.
pub fn matches_any_disqualifier(tokens: &[String], phrases: &[Phrase]) -> bool {
    phrases.iter().any(|p| contains_phrase(tokens, &p.tokens))
}
