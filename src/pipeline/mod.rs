//! The precompute pipeline: master list in, corpus artifacts out.
//!
//! Builds are all-or-nothing. A malformed master-list entry aborts the whole
//! build with a row-level diagnostic, and nothing is published; the
//! previously published corpus stays authoritative. Regeneration is gated on
//! the manifest's source checksums unless forced.

pub mod manifest;
pub mod store;

use crate::config::PipelineConfig;
use crate::error::{Result, TaxonError};
use crate::model::{AliasCorpus, AliasFlags, AliasRecord, CORPUS_FORMAT_VERSION};
use crate::text::{self, ngram, phonetic, signature};
use manifest::{Manifest, CORPUS_ARTIFACT, LIGHTWEIGHT_ARTIFACT};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// The human-editable master list: one YAML document per source file.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterList {
    pub species: Vec<MasterSpecies>,
}

/// One species entry. The canonical name always becomes an alias; the
/// optional tile name and the explicit alias strings add more.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterSpecies {
    pub id: String,
    pub canonical: String,
    #[serde(default)]
    pub tile_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Multiplier applied to every alias weight of this species.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Everything one successful build produces. The caller (or an
/// [`store::ArtifactStore`]) decides where the bytes land.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub corpus: AliasCorpus,
    pub corpus_bytes: Vec<u8>,
    pub lightweight_json: String,
    pub manifest: Manifest,
}

/// Outcome of a gated pipeline run.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// Source checksums match the manifest; existing artifacts untouched.
    UpToDate,
    Rebuilt(Box<BuildArtifacts>),
}

/// Builds the alias corpus from master-list sources.
#[derive(Debug, Clone, Default)]
pub struct PrecomputePipeline {
    config: PipelineConfig,
}

impl PrecomputePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Gated entry point: rebuild only when a source checksum differs from
    /// the previous manifest, the manifest is absent, or `force` is set.
    pub fn run(
        &self,
        sources: &[(String, Vec<u8>)],
        previous: Option<&Manifest>,
        force: bool,
    ) -> Result<BuildOutcome> {
        let current = manifest::source_entries(
            sources.iter().map(|(path, bytes)| (path.as_str(), bytes.as_slice())),
        );
        if !force {
            if let Some(previous) = previous {
                if previous.matches_sources(&current) {
                    info!(sources = sources.len(), "corpus up to date, skipping rebuild");
                    return Ok(BuildOutcome::UpToDate);
                }
            }
        }
        let artifacts = self.build(sources)?;
        Ok(BuildOutcome::Rebuilt(Box::new(artifacts)))
    }

    /// Unconditional end-to-end build.
    pub fn build(&self, sources: &[(String, Vec<u8>)]) -> Result<BuildArtifacts> {
        let mut records = Vec::new();
        let mut seen_species: HashSet<String> = HashSet::new();
        let mut seen_alias_ids: HashSet<String> = HashSet::new();
        let mut row = 0usize;

        for (path, bytes) in sources {
            let text = std::str::from_utf8(bytes).map_err(|_| TaxonError::MasterList(format!(
                "{path}: not valid UTF-8"
            )))?;
            let list: MasterList = serde_yaml::from_str(text)
                .map_err(|e| TaxonError::MasterList(format!("{path}: {e}")))?;

            for species in &list.species {
                row += 1;
                self.validate_species(species, row)?;
                if !seen_species.insert(species.id.clone()) {
                    return Err(TaxonError::BuildFailure {
                        row,
                        reason: format!("duplicate species id {:?}", species.id),
                    });
                }
                self.derive_species(species, path, row, &mut seen_alias_ids, &mut records)?;
            }
        }

        records.sort_by(|a, b| a.alias_id.cmp(&b.alias_id));
        let corpus = AliasCorpus {
            format_version: CORPUS_FORMAT_VERSION,
            minhash_k: self.config.minhash_k,
            ngram_q: self.config.ngram_q,
            records,
        };
        let corpus_bytes = corpus.to_bytes()?;
        let lightweight_json = corpus.to_lightweight_json()?;

        let mut manifest = Manifest::for_sources(sources.iter().cloned());
        manifest.record_output(CORPUS_ARTIFACT, &corpus_bytes);
        manifest.record_output(LIGHTWEIGHT_ARTIFACT, lightweight_json.as_bytes());

        info!(
            species = seen_species.len(),
            aliases = corpus.records.len(),
            bytes = corpus_bytes.len(),
            "corpus built"
        );
        Ok(BuildArtifacts {
            corpus,
            corpus_bytes,
            lightweight_json,
            manifest,
        })
    }

    fn validate_species(&self, species: &MasterSpecies, row: usize) -> Result<()> {
        if species.id.trim().is_empty() {
            return Err(TaxonError::BuildFailure {
                row,
                reason: "missing species id".to_string(),
            });
        }
        if text::normalize(&species.canonical).is_empty() {
            return Err(TaxonError::BuildFailure {
                row,
                reason: format!("species {:?} has an empty canonical name", species.id),
            });
        }
        if let Some(weight) = species.weight {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(TaxonError::BuildFailure {
                    row,
                    reason: format!("species {:?} has invalid weight {weight}", species.id),
                });
            }
        }
        Ok(())
    }

    fn derive_species(
        &self,
        species: &MasterSpecies,
        source_path: &str,
        row: usize,
        seen_alias_ids: &mut HashSet<String>,
        records: &mut Vec<AliasRecord>,
    ) -> Result<()> {
        let multiplier = species.weight.unwrap_or(1.0);
        let mut spoken_forms: Vec<(&str, AliasFlags)> = vec![(
            species.canonical.as_str(),
            AliasFlags {
                canonical_name: true,
                tile_name: false,
            },
        )];
        if let Some(tile) = &species.tile_name {
            spoken_forms.push((
                tile.as_str(),
                AliasFlags {
                    canonical_name: false,
                    tile_name: true,
                },
            ));
        }
        spoken_forms.extend(
            species
                .aliases
                .iter()
                .map(|a| (a.as_str(), AliasFlags::default())),
        );

        for (alias, flags) in spoken_forms {
            let norm = text::normalize(alias);
            if norm.is_empty() {
                return Err(TaxonError::BuildFailure {
                    row,
                    reason: format!(
                        "species {:?}: alias {alias:?} is empty after normalization",
                        species.id
                    ),
                });
            }
            let alias_id = format!("{}:{}", species.id, norm.replace(' ', "-"));
            if !seen_alias_ids.insert(alias_id.clone()) {
                // Same spoken form listed twice for one species; the first
                // occurrence (canonical before tile before aliases) wins.
                debug!(alias_id, "duplicate spoken form skipped");
                continue;
            }

            let base = if flags.canonical_name {
                self.config.canonical_weight
            } else {
                self.config.default_weight
            };
            let mut meta = species.meta.clone();
            meta.insert("source".to_string(), source_path.to_string());

            records.push(self.derive_record(
                alias_id,
                species,
                alias,
                norm,
                base * multiplier,
                flags,
                meta,
            ));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn derive_record(
        &self,
        alias_id: String,
        species: &MasterSpecies,
        alias: &str,
        norm: String,
        weight: f64,
        flags: AliasFlags,
        meta: BTreeMap<String, String>,
    ) -> AliasRecord {
        let tokens = text::tokenize(&norm);
        let encodings = phonetic::encode(&norm);
        let ngrams = ngram::ngrams(&norm, self.config.ngram_q);
        let minhash64 = signature::minhash(&ngrams, self.config.minhash_k);
        let simhash64 = signature::simhash(&tokens);
        AliasRecord {
            alias_id,
            species_id: species.id.clone(),
            canonical: species.canonical.clone(),
            alias: alias.to_string(),
            norm,
            tokens,
            cologne: encodings.cologne,
            double_metaphone: encodings.double_metaphone,
            beider_morse: encodings.beider_morse,
            phonemes: encodings.phonemes,
            ngrams,
            q: self.config.ngram_q,
            minhash64,
            simhash64,
            weight,
            flags,
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIRDS: &str = r#"
species:
  - id: "453"
    canonical: "Alk of Zeekoet"
    tile_name: "Alk/Zeekoet"
    aliases:
      - alk
      - zeekoet
  - id: "12"
    canonical: "Kwak"
    weight: 1.5
"#;

    fn sources() -> Vec<(String, Vec<u8>)> {
        vec![("birds.yaml".to_string(), BIRDS.as_bytes().to_vec())]
    }

    #[test]
    fn test_build_derives_all_spoken_forms() {
        let artifacts = PrecomputePipeline::default().build(&sources()).expect("build");
        let records = &artifacts.corpus.records;
        // canonical + tile + 2 aliases for 453, canonical for 12
        assert_eq!(records.len(), 5);
        assert!(records.iter().any(|r| r.norm == "alk of zeekoet" && r.flags.canonical_name));
        assert!(records.iter().any(|r| r.norm == "alk zeekoet" && r.flags.tile_name));
        assert!(records.iter().any(|r| r.species_id == "12" && r.weight > 1.2));
    }

    #[test]
    fn test_records_are_fully_derived_and_sorted() {
        let artifacts = PrecomputePipeline::default().build(&sources()).expect("build");
        let records = &artifacts.corpus.records;
        assert!(records.windows(2).all(|w| w[0].alias_id < w[1].alias_id));
        for record in records {
            assert_eq!(record.norm, text::normalize(&record.alias));
            assert_eq!(record.minhash64.len(), 64);
            assert!(!record.ngrams.is_empty());
            assert!(!record.cologne.is_empty() || !record.beider_morse.is_empty());
            assert_eq!(record.meta.get("source").map(String::as_str), Some("birds.yaml"));
        }
    }

    #[test]
    fn test_missing_species_id_fails_with_row() {
        let bad = "species:\n  - id: \"1\"\n    canonical: Kwak\n  - id: \"\"\n    canonical: Vos\n";
        let err = PrecomputePipeline::default()
            .build(&[("m.yaml".to_string(), bad.as_bytes().to_vec())])
            .unwrap_err();
        assert_eq!(
            err,
            TaxonError::BuildFailure {
                row: 2,
                reason: "missing species id".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_species_id_fails() {
        let bad = "species:\n  - id: \"1\"\n    canonical: Kwak\n  - id: \"1\"\n    canonical: Vos\n";
        let err = PrecomputePipeline::default()
            .build(&[("m.yaml".to_string(), bad.as_bytes().to_vec())])
            .unwrap_err();
        assert!(matches!(err, TaxonError::BuildFailure { row: 2, .. }));
    }

    #[test]
    fn test_unparseable_master_list_fails() {
        let err = PrecomputePipeline::default()
            .build(&[("m.yaml".to_string(), b"species: [not, a, mapping".to_vec())])
            .unwrap_err();
        assert!(matches!(err, TaxonError::MasterList(_)));
    }

    #[test]
    fn test_run_skips_when_checksums_match() {
        let pipeline = PrecomputePipeline::default();
        let artifacts = pipeline.build(&sources()).expect("build");
        let outcome = pipeline
            .run(&sources(), Some(&artifacts.manifest), false)
            .expect("run");
        assert!(matches!(outcome, BuildOutcome::UpToDate));
    }

    #[test]
    fn test_run_rebuilds_on_changed_source() {
        let pipeline = PrecomputePipeline::default();
        let artifacts = pipeline.build(&sources()).expect("build");
        let edited = vec![(
            "birds.yaml".to_string(),
            BIRDS.replace("Kwak", "Kwartel").into_bytes(),
        )];
        let outcome = pipeline
            .run(&edited, Some(&artifacts.manifest), false)
            .expect("run");
        assert!(matches!(outcome, BuildOutcome::Rebuilt(_)));
    }

    #[test]
    fn test_run_rebuilds_on_force_and_missing_manifest() {
        let pipeline = PrecomputePipeline::default();
        let artifacts = pipeline.build(&sources()).expect("build");
        assert!(matches!(
            pipeline.run(&sources(), Some(&artifacts.manifest), true).expect("forced"),
            BuildOutcome::Rebuilt(_)
        ));
        assert!(matches!(
            pipeline.run(&sources(), None, false).expect("no manifest"),
            BuildOutcome::Rebuilt(_)
        ));
    }

    #[test]
    fn test_forced_rebuild_is_byte_identical() {
        let pipeline = PrecomputePipeline::default();
        let first = pipeline.build(&sources()).expect("first");
        let second = pipeline.build(&sources()).expect("second");
        assert_eq!(first.corpus_bytes, second.corpus_bytes);
        assert_eq!(first.manifest, second.manifest);
    }
}
