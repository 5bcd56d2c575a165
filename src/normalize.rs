//! Ingredient normalizer: raw free-text phrase → canonical token sequence.
//!
//! Total and pure: any input normalizes without error. Unknown text simply
//! lower-cases and tokenizes; quantity/unit prefixes are stripped via the
//! configurable lists in `[normalizer]` of the rule file, and known
//! multi-word phrases (e.g. "soy sauce", "milk thistle") are kept as single
//! atomic tokens so narrow indicators cannot fire inside them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

/// `[normalizer]` section of the rule file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizerCfg {
    /// Leading filler phrases stripped verbatim (e.g. "a pinch of").
    #[serde(default)]
    pub stop_phrases: Vec<String>,
    /// Single words treated as quantity/unit noise at the front of a phrase.
    #[serde(default)]
    pub unit_words: Vec<String>,
    /// Multi-word phrases kept as one matchable unit.
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Compiled normalizer. Built once per catalog load.
#[derive(Debug, Default)]
pub struct Normalizer {
    stop_phrases: Vec<Vec<String>>,
    unit_words: HashSet<String>,
    /// Dictionary phrases as token sequences, longest first (greedy merge).
    phrases: Vec<Vec<String>>,
}

// \w covers [A-Za-z0-9_]; (?u) enables Unicode
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("token regex"));

/// Lower-case and strip common Latin diacritics ("jalapeño" → "jalapeno").
/// Characters outside the table pass through lower-cased.
fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ñ' => 'n',
        'š' => 's',
        'ž' => 'z',
        other => other,
    }
}

fn fold(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .collect()
}

/// True for pure quantity tokens: "2", "½", "100".
/// Fractions like "1/2" tokenize into two numeric tokens and drop the same way.
fn is_quantity(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_numeric())
}

impl Normalizer {
    pub fn compile(cfg: &NormalizerCfg) -> Self {
        let split = |s: &String| -> Vec<String> {
            TOKEN_RE
                .find_iter(&fold(s))
                .map(|m| m.as_str().to_string())
                .collect()
        };

        let stop_phrases = cfg
            .stop_phrases
            .iter()
            .map(split)
            .filter(|p| !p.is_empty())
            .collect();

        let unit_words = cfg.unit_words.iter().map(|w| fold(w)).collect();

        let mut phrases: Vec<Vec<String>> = cfg
            .phrases
            .iter()
            .map(split)
            .filter(|p| p.len() >= 2)
            .collect();
        // Longest first so "sesame seed oil" wins over "sesame seed".
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            stop_phrases,
            unit_words,
            phrases,
        }
    }

    /// Normalize one raw ingredient phrase into its canonical token sequence.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let folded = fold(raw);
        let mut tokens: Vec<String> = TOKEN_RE
            .find_iter(&folded)
            .map(|m| m.as_str().to_string())
            .collect();

        self.strip_prefix(&mut tokens);
        self.merge_phrases(tokens)
    }

    /// Drop leading quantity tokens, unit words, and configured stop phrases
    /// ("2 cups plain flour" → "plain flour"). Never touches interior tokens.
    fn strip_prefix(&self, tokens: &mut Vec<String>) {
        loop {
            if let Some(stop) = self
                .stop_phrases
                .iter()
                .find(|p| tokens.len() >= p.len() && tokens[..p.len()] == p[..])
            {
                tokens.drain(..stop.len());
                continue;
            }
            match tokens.first() {
                Some(t) if is_quantity(t) || self.unit_words.contains(t.as_str()) => {
                    tokens.remove(0);
                }
                _ => break,
            }
        }
    }

    /// Greedy left-to-right merge of dictionary phrases into single tokens.
    fn merge_phrases(&self, tokens: Vec<String>) -> Vec<String> {
        if self.phrases.is_empty() || tokens.is_empty() {
            return tokens;
        }
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let hit = self
                .phrases
                .iter()
                .find(|p| tokens.len() - i >= p.len() && tokens[i..i + p.len()] == p[..]);
            match hit {
                Some(p) => {
                    out.push(p.join(" "));
                    i += p.len();
                }
                None => {
                    out.push(tokens[i].clone());
                    i += 1;
                }
            }
        }
        out
    }
}
