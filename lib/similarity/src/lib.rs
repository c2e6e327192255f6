//! # IncidentX Similarity
//!
//! Exact cosine nearest-neighbour retrieval over a fixed incident corpus.
//!
//! - **Corpus loading**: JSON array or JSON Lines, every row validated up front
//! - **Fit once**: column layout and min-max ranges fit over the whole corpus
//! - **Deterministic ranking**: score descending, ties in corpus order
//! - **Duplicate candidates**: thresholded scan over the best matches
//!
//! ## Example
//!
//! ```rust
//! use incidentx_similarity::SimilarityIndex;
//! use serde_json::json;
//!
//! let row = json!({
//!     "incident_type": "fire", "time_of_day": "night", "has_media": 1,
//!     "upvotes": 4, "flags": 0, "injuries_reported": 1, "people_involved": 2,
//!     "distance_to_responder": 3.5, "near_sensitive_location": 0
//! });
//! let record = row.as_object().unwrap().clone();
//!
//! let index = SimilarityIndex::build(vec![record.clone()]).unwrap();
//! let matches = index.query(&record, 5, 0.0).unwrap();
//! assert_eq!(matches.len(), 1);
//! ```

pub mod corpus;
pub mod index;
pub mod stats;

pub use corpus::{parse_records, read_records, CorpusEntry};
pub use index::{
    top_k_matches, top_match_score, SimilarityIndex, SimilarityMatch, DEFAULT_DUPLICATE_THRESHOLD,
    DEFAULT_TOP_K, DUPLICATE_SCAN_LIMIT,
};
pub use stats::{DatasetStats, NumericSummary};
