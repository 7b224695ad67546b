//! Heavy path: phonetic candidate generation and signature scoring.
//!
//! Invoked only after a fast-path miss or collision. Every stage boundary
//! polls the cancellation token; candidate scoring fans out over the rayon
//! pool but the stage result is assembled in slice order, so a given
//! snapshot, hypothesis, and context always produce the identical decision.

use crate::cancel::CancellationToken;
use crate::config::MatcherConfig;
use crate::error::Result;
use crate::index::AliasIndex;
use crate::matcher::context::MatchContext;
use crate::matcher::MatchResult;
use crate::model::{AliasId, RecordIx, SpeciesId};
use crate::text::{ngram, phonetic, signature};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Static alias weights live on a small scale (canonical 1.0, boosted up to
/// ~1.5); the prior term normalizes against this.
const PRIOR_SCALE: f64 = 1.5;

/// Hypothesis-side features, computed with the same algorithms and the same
/// parameters (from the corpus header) as the pipeline used at build time.
#[derive(Debug, Clone)]
pub struct HypothesisProbe {
    pub norm: String,
    pub tokens: Vec<String>,
    pub encodings: phonetic::PhoneticEncodings,
    pub minhash64: Vec<u64>,
    pub simhash64: u64,
}

impl HypothesisProbe {
    pub fn compute(norm: &str, index: &AliasIndex) -> Self {
        let tokens = crate::text::tokenize(norm);
        let encodings = phonetic::encode(norm);
        let grams = ngram::ngrams(norm, index.ngram_q());
        let minhash64 = signature::minhash(&grams, index.minhash_k());
        let simhash64 = signature::simhash(&tokens);
        Self {
            norm: norm.to_string(),
            tokens,
            encodings,
            minhash64,
            simhash64,
        }
    }
}

#[derive(Debug, Clone)]
struct Scored {
    alias_id: AliasId,
    species_id: SpeciesId,
    score: f64,
    weight: f64,
    in_context: bool,
}

/// Deterministic ranking: score, then static weight, then context presence,
/// then alias id — never encounter order.
fn rank(a: &Scored, b: &Scored) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(b.weight.total_cmp(&a.weight))
        .then(b.in_context.cmp(&a.in_context))
        .then(a.alias_id.cmp(&b.alias_id))
}

/// Run the scored search for an already-normalized hypothesis.
///
/// `seed` carries the fast path's collision list when the exact table was
/// ambiguous; candidate generation is then restricted to those records so
/// the tie is broken by weight and context rather than re-searched.
pub fn resolve(
    index: &AliasIndex,
    config: &MatcherConfig,
    context: &MatchContext,
    cancel: &CancellationToken,
    norm: &str,
    seed: Option<&[RecordIx]>,
) -> Result<MatchResult> {
    cancel.checkpoint()?;
    let probe = HypothesisProbe::compute(norm, index);

    cancel.checkpoint()?;
    let candidates: Vec<RecordIx> = match seed {
        Some(seed) => seed.to_vec(),
        None => index.phonetic_candidates(&probe.encodings),
    };
    if candidates.is_empty() {
        debug!(norm, "no phonetic candidates");
        return Ok(MatchResult::NoMatch);
    }

    cancel.checkpoint()?;
    let scored: Vec<Scored> = candidates
        .par_iter()
        .map(|&ix| score_candidate(index, config, context, &probe, ix))
        .filter(|s| s.score >= config.score_floor)
        .collect();

    cancel.checkpoint()?;
    Ok(select(config, scored, norm))
}

fn score_candidate(
    index: &AliasIndex,
    config: &MatcherConfig,
    context: &MatchContext,
    probe: &HypothesisProbe,
    ix: RecordIx,
) -> Scored {
    let record = index.record(ix);
    let minhash_sim = signature::minhash_similarity(&probe.minhash64, &record.minhash64);
    let simhash_sim = signature::simhash_similarity(probe.simhash64, record.simhash64);
    let token_sim = signature::token_overlap(&probe.tokens, &record.tokens);
    let prior = (record.weight / PRIOR_SCALE).clamp(0.0, 1.0);
    let in_context = context.contains(&record.species_id);

    let mut score = config.weight_minhash * minhash_sim
        + config.weight_simhash * simhash_sim
        + config.weight_tokens * token_sim
        + config.weight_prior * prior;
    if in_context {
        score += config.context_boost;
    }

    Scored {
        alias_id: record.alias_id.clone(),
        species_id: record.species_id.clone(),
        score,
        weight: record.weight,
        in_context,
    }
}

/// Collapse per-alias scores to one entry per species, then apply the
/// threshold/margin acceptance rule.
fn select(config: &MatcherConfig, scored: Vec<Scored>, norm: &str) -> MatchResult {
    let mut per_species: HashMap<&str, &Scored> = HashMap::new();
    for candidate in &scored {
        per_species
            .entry(candidate.species_id.as_str())
            .and_modify(|best| {
                if rank(candidate, best) == Ordering::Less {
                    *best = candidate;
                }
            })
            .or_insert(candidate);
    }
    let mut ranked: Vec<&Scored> = per_species.into_values().collect();
    ranked.sort_by(|a, b| rank(a, b));

    let Some(best) = ranked.first() else {
        debug!(norm, "no candidate cleared the floor");
        return MatchResult::NoMatch;
    };
    let runner_up = ranked.get(1);
    let clear_margin =
        runner_up.map_or(true, |r| best.score - r.score >= config.accept_margin);

    if best.score >= config.accept_threshold && clear_margin {
        debug!(
            norm,
            alias_id = %best.alias_id,
            species_id = %best.species_id,
            score = best.score,
            "heavy path accepted"
        );
        return MatchResult::Matched {
            species_id: best.species_id.clone(),
            confidence: best.score.clamp(0.0, config.confidence_cap),
        };
    }

    let candidates: Vec<(SpeciesId, f64)> = ranked
        .iter()
        .take(config.ambiguous_top_n)
        .map(|s| (s.species_id.clone(), s.score.clamp(0.0, config.confidence_cap)))
        .collect();
    debug!(norm, count = candidates.len(), "heavy path ambiguous");
    MatchResult::Ambiguous { candidates }
}
