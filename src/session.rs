//! One live observation session: sequential hypotheses in, utterance
//! decisions out.
//!
//! A session owns its pending-match buffer and cancellation token; its event
//! stream is sequential, so nothing here needs locking. Decisions leave via
//! the result channel handed out by [`crate::engine::ResolverEngine::open_session`].

use crate::buffer::{BufferEvent, PendingMatchBuffer};
use crate::cancel::CancellationToken;
use crate::engine::ResolverEngine;
use crate::error::{Result, TaxonError};
use crate::matcher::context::MatchContext;
use crate::matcher::MatchResult;
use std::sync::mpsc::Sender;
use tracing::debug;

/// One hypothesis from the transcription collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub text: String,
    /// Transcription confidence as reported by the recognizer, when known.
    pub confidence: Option<f64>,
}

impl Hypothesis {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: Some(confidence),
        }
    }
}

/// Per-session matching state.
pub struct Session {
    engine: ResolverEngine,
    context: MatchContext,
    buffer: PendingMatchBuffer,
    cancel: CancellationToken,
    results: Sender<MatchResult>,
}

impl Session {
    pub(crate) fn new(
        engine: ResolverEngine,
        context: MatchContext,
        results: Sender<MatchResult>,
    ) -> Self {
        let buffer = PendingMatchBuffer::new(engine.config().buffer.clone());
        Self {
            engine,
            context,
            buffer,
            cancel: CancellationToken::new(),
            results,
        }
    }

    /// Handle for cancelling this session's in-flight work from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace the bias snapshot; the session layer refreshes this between
    /// requests as species are added to the observation list.
    pub fn set_context(&mut self, context: MatchContext) {
        self.context = context;
    }

    /// Evaluate one hypothesis and feed the utterance buffer.
    ///
    /// Returns `Err(IndexUnavailable)` when no corpus is loaded. A cancelled
    /// session discards silently: the buffer resets and nothing is emitted.
    pub fn push_hypothesis(&mut self, hypothesis: Hypothesis) -> Result<()> {
        if self.cancel.is_cancelled() {
            self.buffer.cancel();
            return Ok(());
        }
        if let Some(confidence) = hypothesis.confidence {
            if confidence < self.engine.config().buffer.min_transcript_confidence {
                debug!(confidence, "hypothesis below transcript confidence gate");
                return Ok(());
            }
        }

        let result = match self.engine.resolve(&hypothesis.text, &self.context, &self.cancel) {
            Ok(result) => result,
            Err(TaxonError::Cancelled) => {
                self.buffer.cancel();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        match self.buffer.push(result) {
            BufferEvent::Collecting => {}
            BufferEvent::EarlyAccept(decision) | BufferEvent::WindowClosed(decision) => {
                self.emit(decision);
            }
        }
        Ok(())
    }

    /// Clock tick from the host: closes a timed-out window.
    pub fn tick(&mut self) {
        if let Some(decision) = self.buffer.poll() {
            self.emit(decision);
        }
    }

    /// End the session: abort in-flight evaluation and discard the buffer
    /// without emitting.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.buffer.cancel();
    }

    fn emit(&self, decision: MatchResult) {
        // The receiver may already be gone during teardown; that is not an
        // engine error.
        if self.results.send(decision).is_err() {
            debug!("result receiver dropped");
        }
    }
}
