//! Snapshot lifecycle for the loaded index.
//!
//! The manager is the only shared mutable state in the engine, and it is a
//! single atomic pointer: installing a new index swaps the pointer after the
//! snapshot fully validates, so every in-flight match keeps reading its own
//! self-consistent snapshot. There is no lock and no partial mutation.

use super::AliasIndex;
use crate::error::{Result, TaxonError};
use crate::model::AliasCorpus;
use crate::pipeline::manifest::{Manifest, CORPUS_ARTIFACT};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{info, warn};

/// Process-wide holder of the active [`AliasIndex`] snapshot.
#[derive(Debug, Default)]
pub struct AliasManager {
    current: ArcSwapOption<AliasIndex>,
}

impl AliasManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Decode, validate, and atomically publish a new snapshot. On any
    /// decode failure the previous snapshot (if any) stays active.
    pub fn install(&self, bytes: &[u8]) -> Result<()> {
        match AliasIndex::decode(bytes) {
            Ok(index) => {
                info!(records = index.len(), "index snapshot installed");
                self.current.store(Some(Arc::new(index)));
                Ok(())
            }
            Err(err) => {
                warn!(%err, "corpus rejected, keeping previous snapshot");
                Err(err)
            }
        }
    }

    /// Like [`install`](Self::install), but first gates the bytes on the
    /// manifest's recorded corpus checksum.
    pub fn install_verified(&self, bytes: &[u8], manifest: &Manifest) -> Result<()> {
        if !manifest.verify_output(CORPUS_ARTIFACT, bytes) {
            warn!("corpus checksum mismatch, keeping previous snapshot");
            return Err(TaxonError::ChecksumMismatch {
                path: CORPUS_ARTIFACT.to_string(),
            });
        }
        self.install(bytes)
    }

    /// Publish an already-decoded corpus (pipeline output) without a decode
    /// round trip.
    pub fn install_corpus(&self, corpus: AliasCorpus) -> Result<()> {
        let index = AliasIndex::from_corpus(corpus)?;
        info!(records = index.len(), "index snapshot installed");
        self.current.store(Some(Arc::new(index)));
        Ok(())
    }

    /// The active snapshot, or `Err(IndexUnavailable)` when nothing valid
    /// has been installed. The returned handle stays valid across swaps.
    pub fn snapshot(&self) -> Result<Arc<AliasIndex>> {
        self.current.load_full().ok_or(TaxonError::IndexUnavailable)
    }

    /// Drop the active snapshot; subsequent matches see `IndexUnavailable`.
    pub fn reset(&self) {
        self.current.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{corpus, record};

    fn corpus_bytes(tag: &str) -> Vec<u8> {
        corpus(vec![record(
            &format!("1:{tag}"),
            "1",
            "Kwak",
            tag,
        )])
        .to_bytes()
        .expect("encode")
    }

    #[test]
    fn test_empty_manager_is_unavailable() {
        let manager = AliasManager::new();
        assert!(!manager.is_loaded());
        assert_eq!(manager.snapshot().unwrap_err(), TaxonError::IndexUnavailable);
    }

    #[test]
    fn test_install_and_snapshot() {
        let manager = AliasManager::new();
        manager.install(&corpus_bytes("kwak")).expect("install");
        assert!(manager.is_loaded());
        let snapshot = manager.snapshot().expect("snapshot");
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_failed_install_keeps_previous_snapshot() {
        let manager = AliasManager::new();
        manager.install(&corpus_bytes("kwak")).expect("install");
        assert!(manager.install(b"garbage").is_err());
        assert!(manager.is_loaded());
        assert_eq!(manager.snapshot().expect("snapshot").len(), 1);
    }

    #[test]
    fn test_old_handle_survives_swap() {
        let manager = AliasManager::new();
        manager.install(&corpus_bytes("kwak")).expect("install");
        let old = manager.snapshot().expect("old");
        manager.install(&corpus_bytes("vos")).expect("reinstall");
        // The old handle still reads the old generation.
        assert_eq!(old.record(0).norm, "kwak");
        assert_eq!(manager.snapshot().expect("new").record(0).norm, "vos");
    }

    #[test]
    fn test_install_verified_gates_on_checksum() {
        let manager = AliasManager::new();
        let bytes = corpus_bytes("kwak");
        let mut manifest = Manifest::for_sources(vec![("m.yaml".to_string(), b"x".to_vec())]);
        manifest.record_output(CORPUS_ARTIFACT, &bytes);

        assert!(manager.install_verified(b"tampered", &manifest).is_err());
        assert!(!manager.is_loaded());
        manager.install_verified(&bytes, &manifest).expect("verified");
        assert!(manager.is_loaded());
    }

    #[test]
    fn test_reset_unloads() {
        let manager = AliasManager::new();
        manager.install(&corpus_bytes("kwak")).expect("install");
        manager.reset();
        assert!(!manager.is_loaded());
        assert_eq!(manager.snapshot().unwrap_err(), TaxonError::IndexUnavailable);
    }
}
