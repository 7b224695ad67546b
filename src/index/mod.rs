//! In-memory lookup structures built from the published corpus.
//!
//! An [`AliasIndex`] is immutable once built: the exact-match table for the
//! fast path, phonetic buckets for heavy-path candidate generation, and the
//! flat record array for signature comparisons. Replacing an index never
//! mutates the old one; see [`manager::AliasManager`] for publication.

pub mod manager;

use crate::error::{Result, TaxonError};
use crate::model::{AliasCorpus, AliasRecord, RecordIx};
use crate::text::phonetic::PhoneticEncodings;
use std::collections::HashMap;

/// Immutable lookup snapshot over one corpus generation.
#[derive(Debug)]
pub struct AliasIndex {
    records: Vec<AliasRecord>,
    /// `norm` → records sharing that exact normalized form. Several aliases
    /// of different species can normalize identically; the collision list is
    /// preserved, never overwritten.
    exact: HashMap<String, Vec<RecordIx>>,
    cologne: HashMap<String, Vec<RecordIx>>,
    metaphone: HashMap<String, Vec<RecordIx>>,
    beider_morse: HashMap<String, Vec<RecordIx>>,
    minhash_k: u16,
    ngram_q: u8,
}

impl AliasIndex {
    /// Decode a binary corpus artifact and build the lookup structures.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_corpus(AliasCorpus::from_bytes(bytes)?)
    }

    /// Build from an already-decoded corpus, validating record invariants.
    pub fn from_corpus(corpus: AliasCorpus) -> Result<Self> {
        let mut exact: HashMap<String, Vec<RecordIx>> = HashMap::new();
        let mut cologne: HashMap<String, Vec<RecordIx>> = HashMap::new();
        let mut metaphone: HashMap<String, Vec<RecordIx>> = HashMap::new();
        let mut beider_morse: HashMap<String, Vec<RecordIx>> = HashMap::new();
        let mut seen_ids: HashMap<&str, ()> = HashMap::with_capacity(corpus.records.len());

        for (ix, record) in corpus.records.iter().enumerate() {
            if record.norm.is_empty() {
                return Err(TaxonError::Decode(format!(
                    "record {:?} has an empty normalized form",
                    record.alias_id
                )));
            }
            if record.minhash64.len() != corpus.minhash_k as usize {
                return Err(TaxonError::Decode(format!(
                    "record {:?} has a {}-slot signature, corpus declares {}",
                    record.alias_id,
                    record.minhash64.len(),
                    corpus.minhash_k
                )));
            }
            if seen_ids.insert(record.alias_id.as_str(), ()).is_some() {
                return Err(TaxonError::Decode(format!(
                    "duplicate alias id {:?}",
                    record.alias_id
                )));
            }

            let ix = ix as RecordIx;
            exact.entry(record.norm.clone()).or_default().push(ix);
            if !record.cologne.is_empty() {
                cologne.entry(record.cologne.clone()).or_default().push(ix);
            }
            for code in &record.double_metaphone {
                metaphone.entry(code.clone()).or_default().push(ix);
            }
            for code in &record.beider_morse {
                beider_morse.entry(code.clone()).or_default().push(ix);
            }
        }

        Ok(Self {
            minhash_k: corpus.minhash_k,
            ngram_q: corpus.ngram_q,
            records: corpus.records,
            exact,
            cologne,
            metaphone,
            beider_morse,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn minhash_k(&self) -> u16 {
        self.minhash_k
    }

    pub fn ngram_q(&self) -> u8 {
        self.ngram_q
    }

    pub fn record(&self, ix: RecordIx) -> &AliasRecord {
        &self.records[ix as usize]
    }

    pub fn records(&self) -> &[AliasRecord] {
        &self.records
    }

    /// Exact-table lookup for the fast path. A missing entry is an empty
    /// slice, not an error.
    pub fn exact_lookup(&self, norm: &str) -> &[RecordIx] {
        self.exact.get(norm).map_or(&[], Vec::as_slice)
    }

    /// Candidate generation for the heavy path: the union of every phonetic
    /// bucket any of the hypothesis's codes lands in. Sorted and deduplicated
    /// so downstream scoring is order-independent.
    pub fn phonetic_candidates(&self, encodings: &PhoneticEncodings) -> Vec<RecordIx> {
        let mut out = Vec::new();
        if !encodings.cologne.is_empty() {
            if let Some(bucket) = self.cologne.get(&encodings.cologne) {
                out.extend_from_slice(bucket);
            }
        }
        for code in &encodings.double_metaphone {
            if let Some(bucket) = self.metaphone.get(code) {
                out.extend_from_slice(bucket);
            }
        }
        for code in &encodings.beider_morse {
            if let Some(bucket) = self.beider_morse.get(code) {
                out.extend_from_slice(bucket);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}
