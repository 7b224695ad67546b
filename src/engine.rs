//! Top-level resolution engine: fast path first, heavy path on demand.

use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::manager::AliasManager;
use crate::matcher::context::MatchContext;
use crate::matcher::fast::{self, FastOutcome};
use crate::matcher::heavy;
use crate::matcher::MatchResult;
use crate::session::Session;
use crate::text;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use tracing::debug;

/// Resolves single hypotheses against the currently installed index
/// snapshot.
///
/// The engine is cheap to clone (it shares the [`AliasManager`] behind an
/// `Arc`), and every resolution takes its own snapshot handle, so a corpus
/// rebuild mid-request never mixes generations.
#[derive(Debug, Clone)]
pub struct ResolverEngine {
    manager: Arc<AliasManager>,
    config: EngineConfig,
}

impl ResolverEngine {
    pub fn new(manager: Arc<AliasManager>, config: EngineConfig) -> Self {
        Self { manager, config }
    }

    pub fn manager(&self) -> &Arc<AliasManager> {
        &self.manager
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve one hypothesis.
    ///
    /// A unique exact hit never reaches the heavy path. A fast-path
    /// collision seeds heavy-path rescoring so context and weight can break
    /// the tie. `Err(IndexUnavailable)` short-circuits everything while no
    /// snapshot is installed; `Err(Cancelled)` reports a cooperative abort.
    pub fn resolve(
        &self,
        hypothesis: &str,
        context: &MatchContext,
        cancel: &CancellationToken,
    ) -> Result<MatchResult> {
        let snapshot = self.manager.snapshot()?;
        cancel.checkpoint()?;

        let norm = text::normalize(hypothesis);
        if norm.is_empty() {
            return Ok(MatchResult::NoMatch);
        }

        match fast::lookup(&snapshot, &norm) {
            FastOutcome::Matched {
                species_id,
                confidence,
            } => {
                debug!(norm, species_id, "fast path hit");
                Ok(MatchResult::Matched {
                    species_id,
                    confidence,
                })
            }
            FastOutcome::Ambiguous(seed) => {
                debug!(norm, collisions = seed.len(), "fast path collision");
                heavy::resolve(
                    &snapshot,
                    &self.config.matcher,
                    context,
                    cancel,
                    &norm,
                    Some(&seed),
                )
            }
            FastOutcome::Miss => {
                heavy::resolve(&snapshot, &self.config.matcher, context, cancel, &norm, None)
            }
        }
    }

    /// Open a buffered session. Utterance decisions arrive on the returned
    /// channel; the session end keeps the sender.
    pub fn open_session(&self, context: MatchContext) -> (Session, Receiver<MatchResult>) {
        let (tx, rx) = mpsc::channel();
        (Session::new(self.clone(), context, tx), rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaxonError;
    use crate::model::test_support::{corpus, record};

    fn engine() -> ResolverEngine {
        let manager = Arc::new(AliasManager::new());
        let corpus = corpus(vec![
            record("453:alk-of-zeekoet", "453", "Alk of Zeekoet", "alk of zeekoet"),
            record("12:kwak", "12", "Kwak", "kwak"),
        ]);
        manager.install_corpus(corpus).expect("install");
        ResolverEngine::new(manager, EngineConfig::default())
    }

    #[test]
    fn test_exact_hypothesis_takes_fast_path() {
        let result = engine()
            .resolve(
                "Alk of Zeekoet",
                &MatchContext::empty(),
                &CancellationToken::new(),
            )
            .expect("resolve");
        assert_eq!(
            result,
            MatchResult::Matched {
                species_id: "453".to_string(),
                confidence: 1.0
            }
        );
    }

    #[test]
    fn test_empty_hypothesis_is_no_match() {
        let result = engine()
            .resolve("  !? ", &MatchContext::empty(), &CancellationToken::new())
            .expect("resolve");
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_unloaded_manager_short_circuits() {
        let engine = ResolverEngine::new(Arc::new(AliasManager::new()), EngineConfig::default());
        let err = engine
            .resolve("alk", &MatchContext::empty(), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err, TaxonError::IndexUnavailable);
    }

    #[test]
    fn test_cancellation_propagates() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = engine()
            .resolve("alk of zeekoat", &MatchContext::empty(), &cancel)
            .unwrap_err();
        assert_eq!(err, TaxonError::Cancelled);
    }

    #[test]
    fn test_miss_falls_through_to_heavy_path() {
        let result = engine()
            .resolve(
                "alk of zeekoat",
                &MatchContext::empty(),
                &CancellationToken::new(),
            )
            .expect("resolve");
        match result {
            MatchResult::Matched {
                species_id,
                confidence,
            } => {
                assert_eq!(species_id, "453");
                assert!(confidence < 1.0);
            }
            other => panic!("expected heavy-path match, got {other:?}"),
        }
    }
}
