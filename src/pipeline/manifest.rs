//! The checksum manifest that gates corpus regeneration.
//!
//! The manifest records a content hash per master-list source and per
//! published artifact. Before a build, freshly computed source hashes are
//! compared against the recorded ones; only a difference (or a missing or
//! unreadable manifest, or the force flag) triggers a rebuild.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Well-known artifact names used as manifest output keys.
pub const CORPUS_ARTIFACT: &str = "corpus.bin";
pub const LIGHTWEIGHT_ARTIFACT: &str = "corpus.light.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// SHA-256 content hash rendered as lowercase hex.
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// One master-list input as recorded at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Checksum ledger for one published build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Inputs, sorted by path.
    pub sources: Vec<SourceEntry>,
    /// Artifact name to content hash.
    pub outputs: BTreeMap<String, String>,
}

impl Manifest {
    /// Record the given sources; output hashes are added as artifacts are
    /// produced.
    pub fn for_sources(sources: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let mut entries: Vec<SourceEntry> = sources
            .into_iter()
            .map(|(path, bytes)| SourceEntry {
                size_bytes: bytes.len() as u64,
                sha256: checksum(&bytes),
                path,
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            sources: entries,
            outputs: BTreeMap::new(),
        }
    }

    pub fn record_output(&mut self, name: &str, bytes: &[u8]) {
        self.outputs.insert(name.to_string(), checksum(bytes));
    }

    /// True when every current source is present in this manifest with the
    /// same hash and no recorded source has disappeared.
    pub fn matches_sources(&self, current: &[SourceEntry]) -> bool {
        if self.sources.len() != current.len() {
            return false;
        }
        let recorded: BTreeMap<&str, &SourceEntry> = self
            .sources
            .iter()
            .map(|e| (e.path.as_str(), e))
            .collect();
        current.iter().all(|entry| {
            recorded
                .get(entry.path.as_str())
                .is_some_and(|rec| rec.sha256 == entry.sha256)
        })
    }

    /// Verify an artifact's bytes against the recorded output hash.
    pub fn verify_output(&self, name: &str, bytes: &[u8]) -> bool {
        self.outputs
            .get(name)
            .is_some_and(|recorded| *recorded == checksum(bytes))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Hash a set of in-memory sources into comparable entries.
pub fn source_entries<'a>(
    sources: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> Vec<SourceEntry> {
    let mut entries: Vec<SourceEntry> = sources
        .into_iter()
        .map(|(path, bytes)| SourceEntry {
            path: path.to_string(),
            size_bytes: bytes.len() as u64,
            sha256: checksum(bytes),
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}
