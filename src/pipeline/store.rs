//! Artifact persistence boundary.
//!
//! The engine itself never touches the filesystem; the storage collaborator
//! hands it byte streams. [`ArtifactStore`] is that boundary, and
//! [`DirStore`] is the stock directory-backed implementation used by the
//! precompute CLI and tests. Publication is write-to-temp, verify, then an
//! atomic rename per artifact, manifest last — a crash mid-publish never
//! leaves a manifest pointing at half-written artifacts.

use super::manifest::{Manifest, CORPUS_ARTIFACT, LIGHTWEIGHT_ARTIFACT, MANIFEST_FILE};
use super::BuildArtifacts;
use crate::error::{Result, TaxonError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Storage collaborator boundary for corpus artifacts.
pub trait ArtifactStore {
    /// The previously published manifest, if any survives intact.
    fn load_manifest(&self) -> Result<Option<Manifest>>;
    /// The previously published binary corpus, if any.
    fn load_corpus(&self) -> Result<Option<Vec<u8>>>;
    /// Publish a complete build atomically.
    fn publish(&self, artifacts: &BuildArtifacts) -> Result<()>;
}

/// Directory-backed artifact store.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write bytes next to the target, fsync-persist, then rename over it.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(self.root.join(name))
            .map_err(|e| TaxonError::Io(e.to_string()))?;
        Ok(())
    }
}

impl ArtifactStore for DirStore {
    fn load_manifest(&self) -> Result<Option<Manifest>> {
        let Some(bytes) = self.read_optional(MANIFEST_FILE)? else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&bytes);
        // A corrupt manifest is treated as absent: the pipeline will rebuild.
        Ok(Manifest::from_json(&text).ok())
    }

    fn load_corpus(&self) -> Result<Option<Vec<u8>>> {
        self.read_optional(CORPUS_ARTIFACT)
    }

    fn publish(&self, artifacts: &BuildArtifacts) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        if !artifacts.manifest.verify_output(CORPUS_ARTIFACT, &artifacts.corpus_bytes)
            || !artifacts
                .manifest
                .verify_output(LIGHTWEIGHT_ARTIFACT, artifacts.lightweight_json.as_bytes())
        {
            return Err(TaxonError::ChecksumMismatch {
                path: CORPUS_ARTIFACT.to_string(),
            });
        }

        self.write_atomic(CORPUS_ARTIFACT, &artifacts.corpus_bytes)?;
        self.write_atomic(LIGHTWEIGHT_ARTIFACT, artifacts.lightweight_json.as_bytes())?;
        let manifest_json = artifacts
            .manifest
            .to_json()
            .map_err(|e| TaxonError::Io(e.to_string()))?;
        self.write_atomic(MANIFEST_FILE, manifest_json.as_bytes())?;

        info!(root = %self.root.display(), "artifacts published");
        Ok(())
    }
}
