//! Fast path: a single exact-table lookup against the normalized form.
//!
//! No phonetic computation happens here. A miss is a normal outcome that
//! sends the caller to the heavy path, and a cross-species collision is
//! deliberately not resolved here either: the heavy path breaks the tie with
//! context and weight.

use crate::index::AliasIndex;
use crate::model::{RecordIx, SpeciesId};

/// Outcome of the exact-lookup tier.
#[derive(Debug, Clone, PartialEq)]
pub enum FastOutcome {
    /// Exactly one species owns this normalized form.
    Matched {
        species_id: SpeciesId,
        confidence: f64,
    },
    /// Several species share the normalized form; the collision list seeds
    /// heavy-path rescoring.
    Ambiguous(Vec<RecordIx>),
    /// No alias has this normalized form.
    Miss,
}

/// Look up an already-normalized hypothesis in the exact table.
pub fn lookup(index: &AliasIndex, norm: &str) -> FastOutcome {
    let hits = index.exact_lookup(norm);
    if hits.is_empty() {
        return FastOutcome::Miss;
    }
    let first_species = &index.record(hits[0]).species_id;
    if hits
        .iter()
        .all(|&ix| index.record(ix).species_id == *first_species)
    {
        FastOutcome::Matched {
            species_id: first_species.clone(),
            confidence: 1.0,
        }
    } else {
        FastOutcome::Ambiguous(hits.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{corpus, record};

    fn index() -> AliasIndex {
        AliasIndex::from_corpus(corpus(vec![
            record("453:alk-of-zeekoet", "453", "Alk of Zeekoet", "alk of zeekoet"),
            record("1:putter", "1", "Putter", "putter"),
            record("2:putter", "2", "Distelvink", "putter"),
        ]))
        .expect("index")
    }

    #[test]
    fn test_unique_hit_has_full_confidence() {
        let outcome = lookup(&index(), "alk of zeekoet");
        assert_eq!(
            outcome,
            FastOutcome::Matched {
                species_id: "453".to_string(),
                confidence: 1.0
            }
        );
    }

    #[test]
    fn test_cross_species_collision_is_ambiguous() {
        match lookup(&index(), "putter") {
            FastOutcome::Ambiguous(hits) => assert_eq!(hits.len(), 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_form_is_a_miss_not_an_error() {
        assert_eq!(lookup(&index(), "zeearend"), FastOutcome::Miss);
        assert_eq!(lookup(&index(), ""), FastOutcome::Miss);
    }

    #[test]
    fn test_raw_unnormalized_text_misses() {
        // The caller owns normalization; the table only knows normalized keys.
        assert_eq!(lookup(&index(), "Alk of Zeekoet"), FastOutcome::Miss);
    }
}
