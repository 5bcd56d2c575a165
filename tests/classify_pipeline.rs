// tests/classify_pipeline.rs
//
// End-to-end classification against the shipped default catalog
// (config/rules.toml). These pin the safety-critical contract: whole-token
// matching, deterministic ordering, severity aggregation, risk tiering, and
// the dietary-flag data properties of the default rule table.

use allergy_guard::{classify, AllergenCategory, RiskLevel, RuleCatalog, Severity};

const DEFAULT_RULES: &str = include_str!("../config/rules.toml");

fn catalog() -> RuleCatalog {
    RuleCatalog::from_toml_str(DEFAULT_RULES).expect("shipped catalog must validate")
}

fn strings(raws: &[&str]) -> Vec<String> {
    raws.iter().map(|s| s.to_string()).collect()
}

#[test]
fn shipped_catalog_loads_and_is_versioned() {
    let cat = catalog();
    assert!(!cat.version.is_empty());
    assert!(cat.allergen_rules().len() >= 14);
    assert_eq!(cat.dietary_rules().len(), 4);
}

#[test]
fn vacuous_classification() {
    let result = classify(&[], &catalog());
    assert!(result.allergens.is_empty());
    assert_eq!(result.safe_categories, AllergenCategory::ALL.to_vec());
    assert!(result.dietary_flags.vegetarian);
    assert!(result.dietary_flags.vegan);
    assert!(result.dietary_flags.gluten_free);
    assert!(result.dietary_flags.dairy_free);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(result.recommendations.is_empty());
}

#[test]
fn nutmeg_does_not_trigger_nuts() {
    let result = classify(&strings(&["nutmeg"]), &catalog());
    assert!(
        !result.allergens.iter().any(|a| a.category == AllergenCategory::Nuts),
        "whole-token law violated: {:?}",
        result.allergens
    );
}

#[test]
fn narrow_phrases_do_not_trigger_milk() {
    let cat = catalog();
    for dish in ["milk thistle", "coconut milk", "cream of tartar"] {
        let result = classify(&strings(&[dish]), &cat);
        assert!(
            !result.allergens.iter().any(|a| a.category == AllergenCategory::Milk),
            "`{dish}` must not be classified as Milk: {:?}",
            result.allergens
        );
    }
    // The plain words still do.
    let result = classify(&strings(&["whole milk", "double cream"]), &cat);
    assert!(result.allergens.iter().any(|a| a.category == AllergenCategory::Milk));
}

#[test]
fn milk_and_flour_flag_logic() {
    let result = classify(&strings(&["whole milk", "flour"]), &catalog());
    assert!(result.dietary_flags.vegetarian);
    assert!(!result.dietary_flags.vegan);
    assert!(!result.dietary_flags.gluten_free);
    assert!(!result.dietary_flags.dairy_free);
}

#[test]
fn peanut_butter_is_vegan_but_not_peanut_safe() {
    let result = classify(&strings(&["peanut butter"]), &catalog());
    // Atomic "peanut butter" must not trip the dairy "butter" indicator...
    assert!(result.dietary_flags.vegan);
    assert!(result.dietary_flags.dairy_free);
    assert!(!result.allergens.iter().any(|a| a.category == AllergenCategory::Milk));
    // ...but it is firmly a Peanuts hit.
    assert_eq!(result.allergens[0].category, AllergenCategory::Peanuts);
    assert_eq!(result.allergens[0].severity, Severity::High);
}

#[test]
fn quantities_are_ignored() {
    let cat = catalog();
    let with_quantities = classify(
        &strings(&["2 cups flour", "100 g butter", "a pinch of mustard"]),
        &cat,
    );
    let bare = classify(&strings(&["flour", "butter", "mustard"]), &cat);
    assert_eq!(with_quantities.allergens, bare.allergens);
    assert_eq!(with_quantities.risk_level, bare.risk_level);
}

#[test]
fn determinism_byte_identical_json() {
    let cat = catalog();
    let input = strings(&[
        "2 cups flour",
        "whole milk",
        "1 tbsp soy sauce",
        "crushed peanuts",
        "white wine vinegar",
    ]);
    let a = serde_json::to_vec(&classify(&input, &cat)).unwrap();
    for _ in 0..10 {
        let b = serde_json::to_vec(&classify(&input, &cat)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn ordering_severity_desc_then_first_seen() {
    // soy sauce → Gluten-Cereals (medium) + Soya (medium); milk → Milk (high).
    let result = classify(&strings(&["soy sauce", "milk"]), &catalog());
    let categories: Vec<_> = result.allergens.iter().map(|a| a.category).collect();
    assert_eq!(
        categories,
        vec![
            AllergenCategory::Milk,
            AllergenCategory::GlutenCereals,
            AllergenCategory::Soya,
        ]
    );
}

#[test]
fn risk_tiers_against_default_table() {
    let cat = catalog();

    // One high-severity category → HIGH.
    assert_eq!(classify(&strings(&["peanuts"]), &cat).risk_level, RiskLevel::High);

    // One medium-only category → MEDIUM.
    assert_eq!(
        classify(&strings(&["mayonnaise"]), &cat).risk_level,
        RiskLevel::Medium
    );

    // One low-only category → LOW.
    assert_eq!(
        classify(&strings(&["dried apricots"]), &cat).risk_level,
        RiskLevel::Low
    );

    // Three distinct categories escalate regardless of severity: soy sauce
    // alone yields Gluten-Cereals + Soya (both medium); adding a medium eggs
    // hit makes three.
    let three = classify(&strings(&["soy sauce", "mayonnaise"]), &cat);
    assert_eq!(three.allergens.len(), 3);
    assert_eq!(three.risk_level, RiskLevel::High);
}

#[test]
fn high_risk_leads_with_general_caution() {
    let result = classify(&strings(&["shrimp"]), &catalog());
    assert_eq!(result.risk_level, RiskLevel::High);
    assert!(result.recommendations[0].starts_with("High allergen risk"));
    assert!(result.recommendations[1].contains("Crustaceans"));
}

#[test]
fn monotonicity_under_ingredient_addition() {
    let cat = catalog();
    let rank = |r: RiskLevel| match r {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    };

    let mut dish: Vec<String> = Vec::new();
    let mut prev = classify(&dish, &cat);
    for next in ["dried apricots", "mayonnaise", "tahini", "prawns", "celery"] {
        dish.push(next.to_string());
        let current = classify(&dish, &cat);
        for detected in &prev.allergens {
            assert!(
                current.allergens.iter().any(|a| a.category == detected.category),
                "adding `{next}` dropped {:?}",
                detected.category
            );
        }
        assert!(rank(current.risk_level) >= rank(prev.risk_level));
        prev = current;
    }
}

#[test]
fn vegan_disqualifiers_are_superset_of_vegetarian() {
    // vegan ⇒ vegetarian is a property of the rule table, not of the code;
    // pin it so a catalog edit cannot silently break it.
    use allergy_guard::DietaryFlag;
    let cat = catalog();
    let veggie = cat.disqualifiers(DietaryFlag::Vegetarian);
    let vegan = cat.disqualifiers(DietaryFlag::Vegan);
    for phrase in veggie {
        assert!(
            vegan.iter().any(|p| p.tokens == phrase.tokens),
            "vegetarian disqualifier `{}` missing from vegan set",
            phrase.display
        );
    }
    assert!(vegan.len() > veggie.len());
}

#[test]
fn diacritics_and_case_are_insensitive() {
    let cat = catalog();
    let fancy = classify(&strings(&["Crème FRAÎCHE with cream"]), &cat);
    assert!(fancy.allergens.iter().any(|a| a.category == AllergenCategory::Milk));
}
