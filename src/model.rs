//! The alias corpus data model.
//!
//! An [`AliasRecord`] is the immutable unit of the corpus: one spoken-form
//! variant of a species name together with every derived feature the two
//! matching tiers consume. The corpus is produced wholesale by the precompute
//! pipeline, published as a compact binary artifact, and never mutated in
//! place.

use crate::error::{Result, TaxonError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical species identifier from the species master list.
pub type SpeciesId = String;
/// Unique identifier of one alias record.
pub type AliasId = String;
/// Position of a record in the corpus's flat record array.
pub type RecordIx = u32;

/// Bump when the binary layout changes; decode rejects other versions.
pub const CORPUS_FORMAT_VERSION: u32 = 2;

/// Named boolean attributes of an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AliasFlags {
    /// This alias is the canonical/official name of the species.
    pub canonical_name: bool,
    /// This alias is shown on the species' display tile.
    pub tile_name: bool,
}

/// One spoken-form variant of a species name with its derived signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub alias_id: AliasId,
    pub species_id: SpeciesId,
    /// Human-readable canonical name of the owning species.
    pub canonical: String,
    /// Raw spoken-form text as written in the master list.
    pub alias: String,
    /// Normalized form; invariant: `norm == normalize(alias)`.
    pub norm: String,
    /// Ordered word tokens of `norm`.
    pub tokens: Vec<String>,
    /// Kölner Phonetik code.
    pub cologne: String,
    /// Double Metaphone codes, primary first.
    pub double_metaphone: Vec<String>,
    /// Beider-Morse-style variant code set.
    pub beider_morse: BTreeSet<String>,
    /// Optional grapheme-to-phoneme rendering.
    pub phonemes: Option<String>,
    /// Character n-gram set of order `q`.
    pub ngrams: BTreeSet<String>,
    /// N-gram order used for `ngrams`.
    pub q: u8,
    /// MinHash signature over `ngrams`; length equals the corpus header's K.
    pub minhash64: Vec<u64>,
    /// SimHash signature over weighted tokens.
    pub simhash64: u64,
    /// Static prior confidence; canonical names are boosted.
    pub weight: f64,
    pub flags: AliasFlags,
    /// Free-form provenance pairs; never consulted by matching logic.
    pub meta: BTreeMap<String, String>,
}

/// The published corpus: an ordered record array plus the derivation
/// parameters needed to compute comparable hypothesis signatures.
///
/// Records are sorted by `alias_id` and all map-like fields are ordered, so
/// rebuilding from identical input is byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasCorpus {
    pub format_version: u32,
    /// MinHash signature width used at build time.
    pub minhash_k: u16,
    /// N-gram order used at build time.
    pub ngram_q: u8,
    pub records: Vec<AliasRecord>,
}

impl AliasCorpus {
    /// Serialize to the compact binary artifact format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TaxonError::Decode(e.to_string()))
    }

    /// Deserialize and version-check a binary artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let corpus: AliasCorpus =
            bincode::deserialize(bytes).map_err(|e| TaxonError::Decode(e.to_string()))?;
        if corpus.format_version != CORPUS_FORMAT_VERSION {
            return Err(TaxonError::Decode(format!(
                "unsupported corpus format version {}",
                corpus.format_version
            )));
        }
        Ok(corpus)
    }

    /// Render the lightweight human-readable export: every record without
    /// the two heavy signature fields.
    pub fn to_lightweight_json(&self) -> Result<String> {
        let light = LightweightCorpus {
            format_version: self.format_version,
            ngram_q: self.ngram_q,
            records: self.records.iter().map(LightweightRecord::from).collect(),
        };
        serde_json::to_string_pretty(&light).map_err(|e| TaxonError::Decode(e.to_string()))
    }
}

/// Debug/readability export of the corpus, heavy signatures omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightweightCorpus {
    pub format_version: u32,
    pub ngram_q: u8,
    pub records: Vec<LightweightRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightweightRecord {
    pub alias_id: AliasId,
    pub species_id: SpeciesId,
    pub canonical: String,
    pub alias: String,
    pub norm: String,
    pub tokens: Vec<String>,
    pub cologne: String,
    pub double_metaphone: Vec<String>,
    pub beider_morse: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonemes: Option<String>,
    pub ngrams: BTreeSet<String>,
    pub q: u8,
    pub weight: f64,
    pub flags: AliasFlags,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub meta: BTreeMap<String, String>,
}

impl From<&AliasRecord> for LightweightRecord {
    fn from(record: &AliasRecord) -> Self {
        Self {
            alias_id: record.alias_id.clone(),
            species_id: record.species_id.clone(),
            canonical: record.canonical.clone(),
            alias: record.alias.clone(),
            norm: record.norm.clone(),
            tokens: record.tokens.clone(),
            cologne: record.cologne.clone(),
            double_metaphone: record.double_metaphone.clone(),
            beider_morse: record.beider_morse.clone(),
            phonemes: record.phonemes.clone(),
            ngrams: record.ngrams.clone(),
            q: record.q,
            weight: record.weight,
            flags: record.flags,
            meta: record.meta.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::text::{ngram, phonetic, signature};

    /// Build a fully derived record the way the pipeline would.
    pub fn record(alias_id: &str, species_id: &str, canonical: &str, alias: &str) -> AliasRecord {
        let config = PipelineConfig::default();
        let norm = crate::text::normalize(alias);
        let tokens = crate::text::tokenize(&norm);
        let encodings = phonetic::encode(&norm);
        let ngrams = ngram::ngrams(&norm, config.ngram_q);
        let minhash64 = signature::minhash(&ngrams, config.minhash_k);
        let simhash64 = signature::simhash(&tokens);
        AliasRecord {
            alias_id: alias_id.to_string(),
            species_id: species_id.to_string(),
            canonical: canonical.to_string(),
            alias: alias.to_string(),
            norm,
            tokens,
            cologne: encodings.cologne,
            double_metaphone: encodings.double_metaphone,
            beider_morse: encodings.beider_morse,
            phonemes: encodings.phonemes,
            ngrams,
            q: config.ngram_q,
            minhash64,
            simhash64,
            weight: config.default_weight,
            flags: AliasFlags::default(),
            meta: BTreeMap::new(),
        }
    }

    pub fn corpus(records: Vec<AliasRecord>) -> AliasCorpus {
        let config = PipelineConfig::default();
        let mut records = records;
        records.sort_by(|a, b| a.alias_id.cmp(&b.alias_id));
        AliasCorpus {
            format_version: CORPUS_FORMAT_VERSION,
            minhash_k: config.minhash_k,
            ngram_q: config.ngram_q,
            records,
        }
    }
}
