//! Pending-match buffer: one decision per spoken utterance.
//!
//! Speech input delivers several evolving hypotheses for a single utterance.
//! The buffer collects their match results inside a bounded window (count
//! cap and timeout) and reconciles them: a high-confidence match short-cuts
//! the window, otherwise the best buffered attempt wins when the window
//! closes. The buffer is owned by exactly one session and mutated only by
//! its sequential event stream.

use crate::config::BufferConfig;
use crate::matcher::MatchResult;
use std::time::Instant;
use tracing::debug;

/// Externally observable buffer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Idle,
    Collecting,
}

/// What happened to the hypothesis just pushed.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferEvent {
    /// Buffered; the window is still open.
    Collecting,
    /// A high-confidence match ended the window early; the remaining window
    /// is discarded.
    EarlyAccept(MatchResult),
    /// The window closed (count cap, or timeout noticed on arrival) and the
    /// best buffered attempt was chosen.
    WindowClosed(MatchResult),
}

/// Aggregates per-hypothesis results into one utterance decision.
#[derive(Debug)]
pub struct PendingMatchBuffer {
    config: BufferConfig,
    state: BufferState,
    window_opened: Option<Instant>,
    attempts: Vec<MatchResult>,
}

impl PendingMatchBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config,
            state: BufferState::Idle,
            window_opened: None,
            attempts: Vec::new(),
        }
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    fn window_expired(&self, now: Instant) -> bool {
        self.window_opened
            .map_or(false, |opened| now.duration_since(opened) >= self.config.window)
    }

    /// Feed one hypothesis's match result into the current utterance window.
    ///
    /// If the previous window timed out unnoticed, it is closed first and its
    /// decision returned; the incoming result then opens the next window.
    pub fn push(&mut self, result: MatchResult) -> BufferEvent {
        let now = Instant::now();

        if self.state == BufferState::Collecting && self.window_expired(now) {
            let decision = self.close_window();
            self.open_window(now, result);
            return BufferEvent::WindowClosed(decision);
        }

        if result.is_matched() && result.best_score() >= self.config.early_accept {
            debug!(score = result.best_score(), "early accept");
            self.reset();
            return BufferEvent::EarlyAccept(result);
        }

        match self.state {
            BufferState::Idle => self.open_window(now, result),
            BufferState::Collecting => self.attempts.push(result),
        }

        if self.attempts.len() >= self.config.max_hypotheses {
            let decision = self.close_window();
            return BufferEvent::WindowClosed(decision);
        }
        BufferEvent::Collecting
    }

    /// Timeout check for the host's clock tick. Returns the utterance
    /// decision when the window just closed.
    pub fn poll(&mut self) -> Option<MatchResult> {
        if self.state == BufferState::Collecting && self.window_expired(Instant::now()) {
            Some(self.close_window())
        } else {
            None
        }
    }

    /// Session cancelled: discard everything without emitting.
    pub fn cancel(&mut self) {
        debug!(buffered = self.attempts.len(), "buffer cancelled");
        self.reset();
    }

    fn open_window(&mut self, now: Instant, first: MatchResult) {
        self.state = BufferState::Collecting;
        self.window_opened = Some(now);
        self.attempts.clear();
        self.attempts.push(first);
    }

    fn close_window(&mut self) -> MatchResult {
        let decision = self
            .attempts
            .drain(..)
            .max_by(|a, b| {
                a.best_score()
                    .total_cmp(&b.best_score())
                    .then(a.is_matched().cmp(&b.is_matched()))
            })
            .unwrap_or(MatchResult::NoMatch);
        self.reset();
        debug!(score = decision.best_score(), "window closed");
        decision
    }

    fn reset(&mut self) {
        self.state = BufferState::Idle;
        self.window_opened = None;
        self.attempts.clear();
    }
}
