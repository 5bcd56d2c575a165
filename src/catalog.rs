//! Rule catalog: TOML schema, validation, compiled rules, and the shared
//! process-wide handle with atomic whole-catalog swap.
//!
//! The catalog is loaded once at startup and is read-only afterwards. A
//! reload parses and validates a whole new catalog and swaps it in a single
//! `Arc` replacement; a reload that fails validation leaves the previous
//! catalog in effect. In-flight classifications keep the snapshot they
//! captured and never observe a half-updated rule set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::allergen::{AllergenCategory, Severity};
use crate::normalize::{Normalizer, NormalizerCfg};

// --- env defaults & names ---
pub const DEFAULT_RULES_PATH: &str = "config/rules.toml";
pub const ENV_RULES_PATH: &str = "ALLERGY_RULES_PATH";

/// The four dietary flags a dish can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryFlag {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
}

impl DietaryFlag {
    pub const ALL: [DietaryFlag; 4] = [
        DietaryFlag::Vegetarian,
        DietaryFlag::Vegan,
        DietaryFlag::GlutenFree,
        DietaryFlag::DairyFree,
    ];
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub normalizer: NormalizerCfg,
    #[serde(default)]
    pub allergens: Vec<AllergenRuleCfg>,
    #[serde(default)]
    pub dietary: Vec<DietaryRuleCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSection {
    #[serde(default)]
    pub version: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            version: "unversioned".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllergenRuleCfg {
    pub category: AllergenCategory,
    pub severity: Severity,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DietaryRuleCfg {
    pub flag: DietaryFlag,
    pub phrases: Vec<String>,
}

/* ----------------------------
Compiled catalog structures
---------------------------- */

/// An indicator or disqualifier phrase, normalized into the same token space
/// the matcher sees. `display` keeps the original spelling for findings.
#[derive(Debug, Clone)]
pub struct Phrase {
    pub display: String,
    pub tokens: Vec<String>,
}

/// One group of indicator phrases for a category at a single severity.
#[derive(Debug, Clone)]
pub struct AllergenRule {
    pub category: AllergenCategory,
    pub severity: Severity,
    pub phrases: Vec<Phrase>,
}

/// Disqualifier set for one dietary flag; any hit negates the flag.
#[derive(Debug, Clone)]
pub struct DietaryRule {
    pub flag: DietaryFlag,
    pub phrases: Vec<Phrase>,
}

/// Immutable, validated rule catalog. Construct via `from_toml_str` /
/// `from_path`; share via `CatalogHandle`.
#[derive(Debug)]
pub struct RuleCatalog {
    pub version: String,
    pub normalizer: Normalizer,
    allergen_rules: Vec<AllergenRule>,
    dietary_rules: Vec<DietaryRule>,
}

impl RuleCatalog {
    /// Load from a TOML file. Uses ALLERGY_RULES_PATH or defaults to
    /// "config/rules.toml".
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_path(&default_rules_path())
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read rule catalog at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse, normalize, and validate a whole catalog from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: CatalogFile = toml::from_str(toml_str)?;
        let normalizer = Normalizer::compile(&cfg.normalizer);

        if cfg.allergens.is_empty() {
            anyhow::bail!("rule catalog has no allergen rules");
        }

        // Detect the same category+phrase configured at two severities.
        let mut seen: HashMap<(AllergenCategory, String), Severity> = HashMap::new();

        let mut allergen_rules = Vec::with_capacity(cfg.allergens.len());
        for rule in &cfg.allergens {
            let phrases = compile_phrases(&normalizer, &rule.phrases).map_err(|e| {
                anyhow::anyhow!("allergen rule for {}: {}", rule.category, e)
            })?;
            for p in &phrases {
                let key = (rule.category, p.tokens.join(" "));
                if let Some(prev) = seen.insert(key, rule.severity) {
                    if prev != rule.severity {
                        anyhow::bail!(
                            "conflicting severities for {} phrase `{}`",
                            rule.category,
                            p.display
                        );
                    }
                }
            }
            allergen_rules.push(AllergenRule {
                category: rule.category,
                severity: rule.severity,
                phrases,
            });
        }

        // Merge dietary groups per flag; every flag must be covered.
        let mut by_flag: HashMap<DietaryFlag, Vec<Phrase>> = HashMap::new();
        for rule in &cfg.dietary {
            let phrases = compile_phrases(&normalizer, &rule.phrases)
                .map_err(|e| anyhow::anyhow!("dietary rule for {:?}: {}", rule.flag, e))?;
            by_flag.entry(rule.flag).or_default().extend(phrases);
        }
        let mut dietary_rules = Vec::with_capacity(DietaryFlag::ALL.len());
        for flag in DietaryFlag::ALL {
            match by_flag.remove(&flag) {
                Some(phrases) => dietary_rules.push(DietaryRule { flag, phrases }),
                None => anyhow::bail!("rule catalog has no disqualifier set for {:?}", flag),
            }
        }

        Ok(Self {
            version: cfg.catalog.version,
            normalizer,
            allergen_rules,
            dietary_rules,
        })
    }

    pub fn allergen_rules(&self) -> &[AllergenRule] {
        &self.allergen_rules
    }

    pub fn dietary_rules(&self) -> &[DietaryRule] {
        &self.dietary_rules
    }

    /// Disqualifier phrases for one flag. Present for every flag by
    /// construction (validated at load).
    pub fn disqualifiers(&self, flag: DietaryFlag) -> &[Phrase] {
        self.dietary_rules
            .iter()
            .find(|r| r.flag == flag)
            .map(|r| r.phrases.as_slice())
            .unwrap_or(&[])
    }
}

fn compile_phrases(normalizer: &Normalizer, raw: &[String]) -> anyhow::Result<Vec<Phrase>> {
    if raw.is_empty() {
        anyhow::bail!("empty phrase list");
    }
    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        let tokens = normalizer.normalize(r);
        if tokens.is_empty() {
            anyhow::bail!("phrase `{}` normalizes to nothing", r);
        }
        out.push(Phrase {
            display: r.clone(),
            tokens,
        });
    }
    Ok(out)
}

pub fn default_rules_path() -> PathBuf {
    std::env::var(ENV_RULES_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_RULES_PATH))
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Process-wide catalog reference. Readers take a cheap `Arc` snapshot and
/// classify against it lock-free; `swap` replaces the whole catalog at once.
#[derive(Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<RuleCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Snapshot of the currently active catalog. Calls that captured an older
    /// snapshot keep using it until they finish.
    pub fn current(&self) -> Arc<RuleCatalog> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            // Poisoned lock still holds a valid catalog; recover the value.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the active catalog.
    pub fn swap(&self, catalog: RuleCatalog) {
        let next = Arc::new(catalog);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Parse + validate `path` and swap on success. On any failure the
    /// previously active catalog stays in effect (fail-safe).
    pub fn reload_from(&self, path: &Path) -> anyhow::Result<String> {
        let catalog = RuleCatalog::from_path(path)?;
        let version = catalog.version.clone();
        info!(
            version = %version,
            allergen_rules = catalog.allergen_rules.len(),
            "rule catalog reloaded"
        );
        self.swap(catalog);
        Ok(version)
    }
}

/// Returns true if we should enable hot reload (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("ALLERGY_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
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

/// Start a simple polling watcher on `path` to hot-reload the catalog.
/// Polls mtime every 2s. Uses only std, no external deps.
pub fn start_hot_reload_thread(handle: CatalogHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Err(e) = handle.reload_from(&path) {
                            warn!(error = %e, "hot reload rejected; keeping active catalog");
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}

/* ----------------------------
Tests
---------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_TOML: &str = r#"
[catalog]
version = "test-1"

[normalizer]
unit_words = ["cup", "cups"]
phrases = ["soy sauce"]

[[allergens]]
category = "peanuts"
severity = "high"
phrases = ["peanut", "peanut butter"]

[[allergens]]
category = "soya"
severity = "medium"
phrases = ["soy sauce"]

[[dietary]]
flag = "vegetarian"
phrases = ["chicken"]

[[dietary]]
flag = "vegan"
phrases = ["chicken", "milk"]

[[dietary]]
flag = "gluten_free"
phrases = ["flour"]

[[dietary]]
flag = "dairy_free"
phrases = ["milk"]
"#;

    #[test]
    fn loads_and_normalizes_phrases() {
        let cat = RuleCatalog::from_toml_str(MINI_TOML).expect("load");
        assert_eq!(cat.version, "test-1");
        assert_eq!(cat.allergen_rules().len(), 2);
        // "soy sauce" is a dictionary phrase → single atomic token.
        let soya = &cat.allergen_rules()[1];
        assert_eq!(soya.phrases[0].tokens, vec!["soy sauce"]);
        assert_eq!(cat.disqualifiers(DietaryFlag::Vegan).len(), 2);
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = RuleCatalog::from_toml_str("[catalog]\nversion = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("no allergen rules"));
    }

    #[test]
    fn rejects_conflicting_severities() {
        let toml = format!(
            "{MINI_TOML}\n[[allergens]]\ncategory = \"peanuts\"\nseverity = \"low\"\nphrases = [\"peanut\"]\n"
        );
        let err = RuleCatalog::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("conflicting severities"));
    }

    #[test]
    fn same_severity_duplicate_is_allowed() {
        let toml = format!(
            "{MINI_TOML}\n[[allergens]]\ncategory = \"peanuts\"\nseverity = \"high\"\nphrases = [\"peanut\"]\n"
        );
        assert!(RuleCatalog::from_toml_str(&toml).is_ok());
    }

    #[test]
    fn rejects_missing_dietary_flag() {
        let toml = MINI_TOML.replace("flag = \"dairy_free\"", "flag = \"vegan\"");
        let err = RuleCatalog::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("DairyFree"));
    }

    #[test]
    fn rejects_blank_phrase() {
        let toml = MINI_TOML.replace("phrases = [\"flour\"]", "phrases = [\"  \"]");
        assert!(RuleCatalog::from_toml_str(&toml).is_err());
    }

    #[test]
    fn handle_swap_is_whole_catalog() {
        let handle = CatalogHandle::new(RuleCatalog::from_toml_str(MINI_TOML).unwrap());
        let v1 = handle.current();

        let v2_toml = MINI_TOML.replace("test-1", "test-2");
        handle.swap(RuleCatalog::from_toml_str(&v2_toml).unwrap());

        // Captured snapshot is untouched; new readers see the new catalog.
        assert_eq!(v1.version, "test-1");
        assert_eq!(handle.current().version, "test-2");
    }

    #[test]
    fn failed_reload_keeps_active_catalog() {
        let handle = CatalogHandle::new(RuleCatalog::from_toml_str(MINI_TOML).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "this is not toml [[").unwrap();

        assert!(handle.reload_from(&path).is_err());
        assert_eq!(handle.current().version, "test-1");
    }
}
