//! Text normalization and derived features.
//!
//! Everything the pipeline computes per alias lives under this module so the
//! heavy path can recompute the identical features for a hypothesis at match
//! time. A hypothesis and an alias only ever meet in normalized space.

pub mod ngram;
pub mod phonetic;
pub mod signature;

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn punctuation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static pattern"))
}

/// Normalize a spoken-form string for matching.
///
/// Case-folds, strips diacritics (NFKD fold, combining marks removed),
/// replaces punctuation with spaces, and collapses whitespace. Idempotent:
/// `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    let stripped = punctuation_pattern().replace_all(&folded, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split an already-normalized string into word tokens.
pub fn tokenize(norm: &str) -> Vec<String> {
    norm.split_whitespace().map(str::to_string).collect()
}
