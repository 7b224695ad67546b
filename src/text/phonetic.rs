//! Phonetic encodings for the heavy path.
//!
//! Three families of codes are computed per alias (and recomputed per
//! hypothesis): Kölner Phonetik and Double Metaphone via `rphonetic`, and a
//! compact Beider-Morse-style variant set produced in-crate. The variant set
//! branches on ambiguous grapheme clusters before folding to sound classes,
//! so a misheard "zeekoat" lands in the same bucket as "zeekoet".

use rphonetic::{Cologne, DoubleMetaphone, Encoder};
use std::collections::BTreeSet;

/// Upper bound on spelling variants explored per token.
const MAX_VARIANTS: usize = 16;

/// Ambiguous grapheme clusters and their alternative readings, longest first.
/// Applied in a single left-to-right pass; replacements are not re-scanned.
const REWRITES: &[(&str, &[&str])] = &[
    ("tsch", &["c"]),
    ("sch", &["s", "sk"]),
    ("tch", &["c"]),
    ("ch", &["k", "c"]),
    ("ck", &["k"]),
    ("ph", &["f"]),
    ("th", &["t"]),
    ("sh", &["s"]),
    ("dt", &["t"]),
    ("aa", &["a"]),
    ("ee", &["i"]),
    ("oo", &["u"]),
    ("ou", &["u", "o"]),
    ("oa", &["o"]),
    ("ij", &["i", "ei"]),
    ("ei", &["ai", "i"]),
    ("ie", &["i"]),
    ("c", &["k", "s"]),
    ("q", &["k"]),
    ("w", &["v"]),
    ("x", &["ks"]),
    ("y", &["i"]),
    ("j", &["i"]),
    ("z", &["s"]),
];

/// All phonetic codes derived from one normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneticEncodings {
    /// Kölner Phonetik code of the full name (spaces ignored).
    pub cologne: String,
    /// Double Metaphone codes, primary first, alternate second when distinct.
    pub double_metaphone: Vec<String>,
    /// Beider-Morse-style variant codes, unioned across tokens.
    pub beider_morse: BTreeSet<String>,
    /// Best-guess grapheme-to-phoneme rendering of the full name.
    pub phonemes: Option<String>,
}

impl PhoneticEncodings {
    /// True when no encoder produced a usable code (e.g. digits-only input).
    pub fn is_empty(&self) -> bool {
        self.cologne.is_empty() && self.double_metaphone.is_empty() && self.beider_morse.is_empty()
    }
}

/// Encode a normalized string with every phonetic scheme the index buckets
/// on. Must stay byte-for-byte consistent between pipeline and heavy path.
pub fn encode(norm: &str) -> PhoneticEncodings {
    let compact: String = norm.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return PhoneticEncodings::default();
    }

    let cologne = Cologne.encode(&compact);

    let dm = DoubleMetaphone::default();
    let primary = dm.encode(&compact);
    let alternate = dm.encode_alternate(&compact);
    let mut double_metaphone = Vec::with_capacity(2);
    if !primary.is_empty() {
        double_metaphone.push(primary.clone());
    }
    if !alternate.is_empty() && alternate != primary {
        double_metaphone.push(alternate);
    }

    let mut beider_morse = BTreeSet::new();
    for token in norm.split_whitespace() {
        for variant in spelling_variants(token) {
            let code = fold_consonants(&variant);
            if !code.is_empty() {
                beider_morse.insert(code);
            }
        }
    }

    let phonemes = spelling_variants(&compact)
        .into_iter()
        .next()
        .map(|v| collapse_runs(&v))
        .filter(|p| !p.is_empty());

    PhoneticEncodings {
        cologne,
        double_metaphone,
        beider_morse,
        phonemes,
    }
}

/// Expand a token into alternative spellings by branching on ambiguous
/// grapheme clusters. Deterministic: the result is sorted and bounded.
fn spelling_variants(token: &str) -> Vec<String> {
    let mut variants: Vec<String> = vec![String::new()];
    let bytes = token.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let rest = &token[pos..];
        let rule = REWRITES.iter().find(|(pat, _)| rest.starts_with(pat));
        match rule {
            Some((pat, alts)) => {
                let mut next = Vec::with_capacity(variants.len() * alts.len());
                for base in &variants {
                    for alt in *alts {
                        let mut v = base.clone();
                        v.push_str(alt);
                        next.push(v);
                    }
                }
                variants = next;
                pos += pat.len();
            }
            None => {
                // Multi-byte chars never start a rewrite pattern; copy whole.
                let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                for v in &mut variants {
                    v.push_str(&rest[..ch_len]);
                }
                pos += ch_len;
            }
        }
        if variants.len() > MAX_VARIANTS {
            variants.sort();
            variants.dedup();
            variants.truncate(MAX_VARIANTS);
        }
    }
    variants.sort();
    variants.dedup();
    variants
}

/// Fold a spelling variant to its consonant skeleton: leading character kept,
/// interior vowels dropped, runs collapsed.
fn fold_consonants(variant: &str) -> String {
    let mut out = String::new();
    let mut last: Option<char> = None;
    for (i, c) in variant.chars().enumerate() {
        let keep = i == 0 || !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u');
        if keep && last != Some(c) {
            out.push(c);
            last = Some(c);
        } else if !keep {
            last = None;
        }
    }
    out
}

fn collapse_runs(s: &str) -> String {
    let mut out = String::new();
    let mut last: Option<char> = None;
    for c in s.chars() {
        if last != Some(c) {
            out.push(c);
        }
        last = Some(c);
    }
    out
}
