//! Engine configuration.
//!
//! All tunables live here so the precompute pipeline and the matcher stay in
//! lockstep: the n-gram order and MinHash width used at build time are
//! embedded in the corpus header, and [`MatcherConfig`] must be evaluated
//! against a corpus built with the same parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for record derivation in the precompute pipeline.
///
/// `ngram_q` and `minhash_k` are persisted into the corpus header; the heavy
/// path recomputes hypothesis signatures with the values found there, not
/// with whatever the local default happens to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Character n-gram order for the similarity signatures.
    pub ngram_q: u8,
    /// Number of MinHash signature slots (independent hash functions).
    pub minhash_k: u16,
    /// Weight assigned to an alias marked as the canonical/official name.
    pub canonical_weight: f64,
    /// Weight assigned to a plain alias.
    pub default_weight: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ngram_q: 3,
            minhash_k: 64,
            canonical_weight: 1.0,
            default_weight: 0.8,
        }
    }
}

/// Scoring and selection knobs for the heavy path.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Minimum winning score for a heavy-path `Matched` result.
    pub accept_threshold: f64,
    /// Minimum lead over the runner-up; anything closer is `Ambiguous`.
    pub accept_margin: f64,
    /// Candidates scoring below this floor are dropped entirely.
    pub score_floor: f64,
    /// Number of candidates reported in an `Ambiguous` result.
    pub ambiguous_top_n: usize,
    /// Additive boost for candidates whose species is already active in the
    /// session's match context.
    pub context_boost: f64,
    /// Relative weight of the MinHash Jaccard estimate.
    pub weight_minhash: f64,
    /// Relative weight of the SimHash Hamming similarity.
    pub weight_simhash: f64,
    /// Relative weight of the token-overlap ratio.
    pub weight_tokens: f64,
    /// Relative weight of the alias's static prior weight.
    pub weight_prior: f64,
    /// Heavy-path confidence never reaches this cap; only an exact fast-path
    /// hit reports 1.0.
    pub confidence_cap: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.55,
            accept_margin: 0.05,
            score_floor: 0.30,
            ambiguous_top_n: 3,
            context_boost: 0.10,
            weight_minhash: 0.40,
            weight_simhash: 0.10,
            weight_tokens: 0.35,
            weight_prior: 0.15,
            confidence_cap: 0.97,
        }
    }
}

impl MatcherConfig {
    /// Stricter acceptance for noisy environments: fewer false accepts, more
    /// `Ambiguous` prompts.
    pub fn strict() -> Self {
        Self {
            accept_threshold: 0.65,
            accept_margin: 0.08,
            ..Self::default()
        }
    }

    /// Looser acceptance for well-trained speakers and short lists.
    pub fn permissive() -> Self {
        Self {
            accept_threshold: 0.48,
            accept_margin: 0.03,
            score_floor: 0.25,
            ..Self::default()
        }
    }
}

/// Window bounds for the pending-match buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferConfig {
    /// Maximum hypotheses accepted for a single utterance.
    pub max_hypotheses: usize,
    /// Wall-clock bound on the collection window.
    pub window: Duration,
    /// A `Matched` result at or above this confidence is emitted immediately
    /// and the rest of the window is discarded.
    pub early_accept: f64,
    /// Hypotheses whose transcription confidence falls below this are not
    /// evaluated at all (hypotheses without a reported confidence always
    /// are).
    pub min_transcript_confidence: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_hypotheses: 4,
            window: Duration::from_millis(1200),
            early_accept: 0.90,
            min_transcript_confidence: 0.15,
        }
    }
}

/// Aggregate configuration for a [`crate::engine::ResolverEngine`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub pipeline: PipelineConfig,
    pub matcher: MatcherConfig,
    pub buffer: BufferConfig,
}

impl EngineConfig {
    /// Tighter windows and stricter acceptance; suited to rapid-fire counts
    /// where a wrong accept costs more than a disambiguation prompt.
    pub fn low_latency() -> Self {
        Self {
            matcher: MatcherConfig::strict(),
            buffer: BufferConfig {
                max_hypotheses: 2,
                window: Duration::from_millis(600),
                ..BufferConfig::default()
            },
            ..Self::default()
        }
    }

    /// Wider windows and looser acceptance; suited to review sessions where
    /// recall matters more than latency.
    pub fn high_recall() -> Self {
        Self {
            matcher: MatcherConfig::permissive(),
            buffer: BufferConfig {
                max_hypotheses: 8,
                window: Duration::from_millis(2500),
                ..BufferConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_parameters() {
        let config = PipelineConfig::default();
        assert_eq!(config.ngram_q, 3);
        assert_eq!(config.minhash_k, 64);
        assert!(config.canonical_weight > config.default_weight);
    }

    #[test]
    fn test_scoring_weights_sum_to_one() {
        let config = MatcherConfig::default();
        let sum = config.weight_minhash
            + config.weight_simhash
            + config.weight_tokens
            + config.weight_prior;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_presets_differ_in_strictness() {
        assert!(MatcherConfig::strict().accept_threshold > MatcherConfig::default().accept_threshold);
        assert!(
            MatcherConfig::permissive().accept_threshold < MatcherConfig::default().accept_threshold
        );
        assert!(EngineConfig::low_latency().buffer.window < EngineConfig::high_recall().buffer.window);
    }

    #[test]
    fn test_confidence_cap_below_exact_match() {
        assert!(MatcherConfig::default().confidence_cap < 1.0);
    }
}
