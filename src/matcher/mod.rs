//! Two-tier matching: exact fast path, scored heavy path.

pub mod context;
pub mod fast;
pub mod heavy;

use crate::model::SpeciesId;

/// The engine's decision for one hypothesis (or one buffered utterance).
///
/// "No index loaded" is deliberately not a variant here; it is
/// [`crate::error::TaxonError::IndexUnavailable`], so callers cannot confuse
/// "the data said no" with "there was no data to ask".
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// A single species won. Confidence is 1.0 only for a unique exact
    /// fast-path hit; heavy-path confidence is capped below that.
    Matched {
        species_id: SpeciesId,
        confidence: f64,
    },
    /// More than one species is plausible; candidates are ordered best
    /// first for the disambiguation prompt.
    Ambiguous {
        candidates: Vec<(SpeciesId, f64)>,
    },
    /// Nothing cleared the score floor.
    NoMatch,
}

impl MatchResult {
    /// Ranking value used by the pending-match buffer when the window
    /// closes: a match ranks by its confidence, an ambiguous result by its
    /// best candidate, and `NoMatch` by zero.
    pub fn best_score(&self) -> f64 {
        match self {
            MatchResult::Matched { confidence, .. } => *confidence,
            MatchResult::Ambiguous { candidates } => {
                candidates.first().map_or(0.0, |(_, score)| *score)
            }
            MatchResult::NoMatch => 0.0,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}
