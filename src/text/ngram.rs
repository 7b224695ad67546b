//! Character n-gram extraction for similarity signatures.

use std::collections::BTreeSet;

/// Boundary padding marker. Padding lets the first and last characters of a
/// name contribute as many n-grams as interior ones, which matters for the
/// short aliases common in field lists.
const PAD: char = '\u{1}';

/// Extract the set of padded character q-grams from a normalized string.
///
/// The input is padded with `q - 1` sentinel characters on both ends before
/// windowing. Returns an ordered set so downstream encodings are stable.
pub fn ngrams(norm: &str, q: u8) -> BTreeSet<String> {
    let q = q.max(1) as usize;
    let mut grams = BTreeSet::new();
    if norm.is_empty() {
        return grams;
    }
    let mut chars: Vec<char> = Vec::with_capacity(norm.chars().count() + 2 * (q - 1));
    chars.extend(std::iter::repeat(PAD).take(q - 1));
    chars.extend(norm.chars());
    chars.extend(std::iter::repeat(PAD).take(q - 1));
    for window in chars.windows(q) {
        grams.insert(window.iter().collect());
    }
    grams
}
