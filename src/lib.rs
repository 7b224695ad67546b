//! # Taxon Engine
//!
//! A two-tier species alias resolution engine for field data collection:
//! turns a noisy speech-to-text hypothesis into a canonical species
//! identifier, fast enough to keep up with live observation and robust
//! against misheard names.
//!
//! ## Architecture
//!
//! ```text
//! master list (YAML)
//!       │  precompute pipeline (checksum-gated)
//!       ▼
//! binary corpus + lightweight export + manifest
//!       │  alias manager (atomic snapshot swap)
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │ fast path: exact lookup on normalized   │──hit──► Matched (1.0)
//! │ form, O(1), no phonetics                │
//! └─────────────────────────────────────────┘
//!       │ miss / cross-species collision
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │ heavy path: phonetic buckets → MinHash/ │──► Matched (<1.0)
//! │ SimHash/token scoring + context bias    │    Ambiguous / NoMatch
//! └─────────────────────────────────────────┘
//!       │ per-hypothesis results
//!       ▼
//! pending-match buffer (one decision per utterance)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use taxon_engine::{
//!     AliasManager, EngineConfig, Hypothesis, MatchContext, PrecomputePipeline, ResolverEngine,
//! };
//! use std::sync::Arc;
//!
//! // Build a corpus from the master list and install it.
//! let artifacts = PrecomputePipeline::default()
//!     .build(&[("birds.yaml".to_string(), master_list_bytes)])?;
//! let manager = Arc::new(AliasManager::new());
//! manager.install_verified(&artifacts.corpus_bytes, &artifacts.manifest)?;
//!
//! // Resolve hypotheses through a buffered session.
//! let engine = ResolverEngine::new(manager, EngineConfig::default());
//! let (mut session, decisions) = engine.open_session(MatchContext::empty());
//! session.push_hypothesis(Hypothesis::new("alk of zeekoet"))?;
//! println!("{:?}", decisions.try_recv());
//! # Ok::<(), taxon_engine::TaxonError>(())
//! ```

pub mod buffer;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod text;

// Primary engine interface
pub use engine::ResolverEngine;
pub use session::{Hypothesis, Session};

// Corpus build and lifecycle
pub use index::manager::AliasManager;
pub use index::AliasIndex;
pub use pipeline::manifest::Manifest;
pub use pipeline::store::{ArtifactStore, DirStore};
pub use pipeline::{BuildArtifacts, BuildOutcome, PrecomputePipeline};

// Core types and errors
pub use buffer::{BufferEvent, BufferState, PendingMatchBuffer};
pub use cancel::CancellationToken;
pub use config::{BufferConfig, EngineConfig, MatcherConfig, PipelineConfig};
pub use error::{Result, TaxonError};
pub use matcher::context::MatchContext;
pub use matcher::MatchResult;
pub use model::{AliasCorpus, AliasFlags, AliasRecord, SpeciesId};
