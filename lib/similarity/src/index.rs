//! Similarity Index
//!
//! Exact cosine retrieval over a fixed corpus. The column layout and
//! rescaling are fit once over the whole corpus at build time; queries are
//! projected with those fitted parameters and never refit.
//!
//! ```text
//! query ──> validate ──> project (corpus-fitted) ──> cosine vs every entry
//!                                                          │
//!                        top_k <── rank (score desc, ──────┘
//!                                  position asc) <── score >= min_similarity
//! ```

use crate::corpus::{read_records, CorpusEntry};
use crate::stats::DatasetStats;
use incidentx_core::{
    cosine_with_norms, Capability, Error, FeatureVector, RawAttributes, Result, ValidationError,
};
use incidentx_schema::{fit_layout, templates, validate, FeatureProjector, FieldSpec, SchemaError, SchemaSpec};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.8;
/// How many candidates a duplicate scan considers
pub const DUPLICATE_SCAN_LIMIT: usize = 20;

/// A corpus entry and its cosine score against a query
#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatch<'a> {
    pub entry: &'a CorpusEntry,
    pub score: f64,
}

/// Score of the best match, 0.0 for no matches
pub fn top_match_score(matches: &[SimilarityMatch<'_>]) -> f64 {
    matches.first().map_or(0.0, |m| m.score)
}

/// Ranking key: higher score first, then earlier corpus position.
/// Orders "worse" as greater so a max-heap evicts the worst kept candidate.
#[derive(Clone, Copy)]
struct Ranked {
    idx: usize,
    score: f64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keep the best `top_k` of `(position, score)` pairs scoring at least
/// `min_similarity`, best first. Ties keep position order.
pub fn top_k_matches(
    scores: impl IntoIterator<Item = (usize, f64)>,
    top_k: usize,
    min_similarity: f64,
) -> Vec<(usize, f64)> {
    if top_k == 0 {
        return Vec::new();
    }
    let mut heap = BinaryHeap::with_capacity(top_k + 1);
    for (idx, score) in scores {
        // NaN never passes
        if !(score >= min_similarity) {
            continue;
        }
        heap.push(Ranked { idx, score });
        if heap.len() > top_k {
            heap.pop();
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|r| (r.idx, r.score))
        .collect()
}

/// Any finite cutoff is accepted; a negative one keeps every entry
fn check_similarity_threshold(value: f64) -> std::result::Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::InvalidThreshold(value))
    }
}

/// Read-only index over a fixed corpus
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    projector: FeatureProjector,
    entries: Vec<CorpusEntry>,
    norms: Vec<f64>,
    stats: DatasetStats,
    source: Option<PathBuf>,
}

impl SimilarityIndex {
    /// Build over `records` with the built-in similarity fields
    pub fn build(records: Vec<RawAttributes>) -> Result<Self> {
        Self::build_with_fields(templates::similarity_fields(), records)
    }

    /// Validate every row, fit the layout once, project every row.
    ///
    /// Any invalid row fails the whole build.
    pub fn build_with_fields(fields: Vec<FieldSpec>, records: Vec<RawAttributes>) -> Result<Self> {
        if records.is_empty() {
            return Err(SchemaError::EmptyCorpus.into());
        }

        // Domain-wide layout, used only to check rows before fitting
        let contract = SchemaSpec::new(
            Capability::Similarity,
            fields.clone(),
            templates::column_transformer_layout(&fields),
            Vec::new(),
        )?;
        for (idx, row) in records.iter().enumerate() {
            validate(row, &contract)
                .map_err(|e| Error::InvalidArtifact(format!("corpus row {}: {}", idx, e)))?;
        }

        let schema = fit_layout(Capability::Similarity, fields, &records)?;
        let projector = FeatureProjector::new(Arc::new(schema));

        let vectors: Vec<FeatureVector> = records
            .par_iter()
            .map(|row| projector.project(row))
            .collect::<Result<_>>()?;
        let stats = DatasetStats::compute(projector.schema().fields(), &records);

        let entries: Vec<CorpusEntry> = records
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (record, vector))| CorpusEntry { position, record, vector })
            .collect();
        let norms = entries.iter().map(|e| e.vector.norm()).collect();

        debug!(
            "Built similarity index: {} entries, {} columns",
            entries.len(),
            projector.columns().len()
        );

        Ok(Self {
            projector,
            entries,
            norms,
            stats,
            source: None,
        })
    }

    /// Load a corpus file and build the index over it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let records = read_records(path)?;
        let mut index = Self::build(records)?;
        index.source = Some(path.to_path_buf());

        info!(
            "Loaded {} incidents from {} ({} columns)",
            index.len(),
            path.display(),
            index.schema().dim()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn projector(&self) -> &FeatureProjector {
        &self.projector
    }

    pub fn schema(&self) -> &SchemaSpec {
        self.projector.schema()
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Top `top_k` corpus entries scoring at least `min_similarity`
    pub fn query(
        &self,
        raw: &RawAttributes,
        top_k: usize,
        min_similarity: f64,
    ) -> Result<Vec<SimilarityMatch<'_>>> {
        let min_similarity = check_similarity_threshold(min_similarity)?;
        let query = self.projector.prepare(raw)?;
        Ok(self.rank(&query, top_k, min_similarity))
    }

    /// Duplicate candidates: up to [`DUPLICATE_SCAN_LIMIT`] entries scoring at
    /// least `threshold`. Empty means no duplicate.
    pub fn find_duplicates(&self, raw: &RawAttributes, threshold: f64) -> Result<Vec<SimilarityMatch<'_>>> {
        let mut matches = self.query(raw, DUPLICATE_SCAN_LIMIT, threshold)?;
        matches.retain(|m| m.score >= threshold);
        Ok(matches)
    }

    /// Pairwise cosine similarity between `rows`, each projected with the
    /// corpus-fitted schema
    pub fn similarity_matrix(&self, rows: &[RawAttributes]) -> Result<Vec<Vec<f64>>> {
        let vectors: Vec<FeatureVector> = rows
            .par_iter()
            .map(|row| self.projector.prepare(row))
            .collect::<Result<_>>()?;
        let norms: Vec<f64> = vectors.iter().map(FeatureVector::norm).collect();

        Ok((0..vectors.len())
            .into_par_iter()
            .map(|i| {
                (0..vectors.len())
                    .map(|j| {
                        if i == j && norms[i] > 0.0 {
                            1.0
                        } else {
                            cosine_with_norms(&vectors[i], norms[i], &vectors[j], norms[j])
                        }
                    })
                    .collect()
            })
            .collect())
    }

    fn rank(&self, query: &FeatureVector, top_k: usize, min_similarity: f64) -> Vec<SimilarityMatch<'_>> {
        let query_norm = query.norm();
        let scores: Vec<f64> = self
            .entries
            .par_iter()
            .zip(self.norms.par_iter())
            .map(|(entry, norm)| cosine_with_norms(query, query_norm, &entry.vector, *norm))
            .collect();

        top_k_matches(scores.into_iter().enumerate(), top_k, min_similarity)
            .into_iter()
            .map(|(idx, score)| SimilarityMatch {
                entry: &self.entries[idx],
                score,
            })
            .collect()
    }
}
