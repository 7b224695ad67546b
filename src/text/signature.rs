//! Similarity signatures: MinHash over n-gram sets, SimHash over tokens.
//!
//! MinHash slot agreement estimates Jaccard similarity between two n-gram
//! sets; SimHash Hamming distance estimates weighted token similarity. Both
//! are computed once per alias at build time and once per hypothesis at
//! match time.

use std::collections::BTreeSet;

/// 64-bit FNV-1a, the seed folded in up front so each MinHash slot sees an
/// independent hash function.
fn hash64(data: &str, seed: u64) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET ^ mix64(seed);
    for byte in data.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    mix64(hash)
}

/// splitmix64 finalizer; decorrelates consecutive seeds.
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Compute a `k`-slot MinHash signature over an n-gram set.
///
/// Empty sets yield an all-`u64::MAX` signature, which agrees with nothing
/// (including another empty signature's estimate being 1.0 is avoided by the
/// caller checking emptiness first).
pub fn minhash(ngrams: &BTreeSet<String>, k: u16) -> Vec<u64> {
    let mut signature = vec![u64::MAX; k as usize];
    for gram in ngrams {
        for (slot, value) in signature.iter_mut().enumerate() {
            let h = hash64(gram, slot as u64);
            if h < *value {
                *value = h;
            }
        }
    }
    signature
}

/// Estimated Jaccard similarity: matching slots over total slots.
pub fn minhash_similarity(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let matching = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matching as f64 / a.len() as f64
}

/// Compute a 64-bit SimHash over token features weighted by length, so
/// content words dominate fillers like "of".
pub fn simhash(tokens: &[String]) -> u64 {
    if tokens.is_empty() {
        return 0;
    }
    let mut lanes = [0i64; 64];
    for token in tokens {
        let weight = token.chars().count() as i64;
        let h = hash64(token, 0);
        for (bit, lane) in lanes.iter_mut().enumerate() {
            if h & (1u64 << bit) != 0 {
                *lane += weight;
            } else {
                *lane -= weight;
            }
        }
    }
    let mut out = 0u64;
    for (bit, lane) in lanes.iter().enumerate() {
        if *lane > 0 {
            out |= 1u64 << bit;
        }
    }
    out
}

/// Hamming-derived similarity: `1 - distance/64`.
pub fn simhash_similarity(a: u64, b: u64) -> f64 {
    1.0 - f64::from((a ^ b).count_ones()) / 64.0
}

/// Overlap ratio between two token sequences: shared tokens over the larger
/// sequence's length.
pub fn token_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let shared = b
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .intersection(&set)
        .count();
    shared as f64 / a.len().max(b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ngram::ngrams;
    use crate::text::tokenize;

    #[test]
    fn test_minhash_identical_sets_agree_fully() {
        let grams = ngrams("alk of zeekoet", 3);
        let a = minhash(&grams, 64);
        let b = minhash(&grams, 64);
        assert_eq!(minhash_similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_minhash_similar_sets_agree_partially() {
        let a = minhash(&ngrams("zeekoet", 3), 64);
        let b = minhash(&ngrams("zeekoat", 3), 64);
        let sim = minhash_similarity(&a, &b);
        assert!(sim > 0.2 && sim < 1.0, "similarity {sim}");
    }

    #[test]
    fn test_minhash_disjoint_sets_rarely_agree() {
        let a = minhash(&ngrams("kwak", 3), 64);
        let b = minhash(&ngrams("buizerd", 3), 64);
        assert!(minhash_similarity(&a, &b) < 0.2);
    }

    #[test]
    fn test_minhash_length_mismatch_is_zero() {
        assert_eq!(minhash_similarity(&[1, 2], &[1, 2, 3]), 0.0);
        assert_eq!(minhash_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_simhash_deterministic() {
        let tokens = tokenize("alk of zeekoet");
        assert_eq!(simhash(&tokens), simhash(&tokens));
    }

    #[test]
    fn test_simhash_similarity_bounds() {
        let a = simhash(&tokenize("alk of zeekoet"));
        let b = simhash(&tokenize("alk of zeekoat"));
        let sim = simhash_similarity(a, b);
        assert!((0.0..=1.0).contains(&sim));
        assert_eq!(simhash_similarity(a, a), 1.0);
    }

    #[test]
    fn test_long_tokens_outweigh_fillers() {
        let with_filler = simhash(&tokenize("grote zeekoet of"));
        let without = simhash(&tokenize("grote zeekoet"));
        let unrelated = simhash(&tokenize("kleine strandloper"));
        assert!(
            simhash_similarity(with_filler, without) > simhash_similarity(with_filler, unrelated)
        );
    }

    #[test]
    fn test_token_overlap() {
        let a = tokenize("alk of zeekoet");
        let b = tokenize("zeekoet");
        assert!((token_overlap(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(token_overlap(&a, &a), 1.0);
        assert_eq!(token_overlap(&a, &[]), 0.0);
    }
}
