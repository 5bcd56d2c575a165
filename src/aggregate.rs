//! Allergen aggregator: folds per-ingredient findings into the deduplicated,
//! severity-ordered category set.

use crate::allergen::{AllergenCategory, Severity};
use crate::matcher::AllergenFinding;

/// Group findings by category; severity = max among the group. Output order:
/// severity descending, then by first-seen order of the category. The result
/// is fully deterministic for a given finding sequence.
pub fn aggregate(findings: &[AllergenFinding]) -> Vec<(AllergenCategory, Severity)> {
    let mut out: Vec<(AllergenCategory, Severity)> = Vec::new();
    for f in findings {
        match out.iter_mut().find(|(c, _)| *c == f.category) {
            Some((_, sev)) => *sev = (*sev).max(f.severity),
            None => out.push((f.category, f.severity)),
        }
    }
    // Stable sort keeps first-seen order within equal severity.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// The fixed 14-category universe minus the detected categories, in canonical
/// declaration order. "Safe" here means "not detected", not certified absent.
pub fn safe_categories(detected: &[(AllergenCategory, Severity)]) -> Vec<AllergenCategory> {
    AllergenCategory::ALL
        .into_iter()
        .filter(|c| !detected.iter().any(|(d, _)| d == c))
        .collect()
}
