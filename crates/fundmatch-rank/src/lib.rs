//! Similarity and ranking over precomputed embeddings.
//!
//! Cosine similarity, the call × site similarity matrix, stable top-K
//! selection (per query, per row/column, and across the whole matrix), and
//! competency scoring with proportional bar indicators.

pub mod competency;
pub mod matrix;
pub mod ranking;
pub mod similarity;

pub use competency::{progress_bar, Competency, CompetencyScore, CompetencySet};
pub use matrix::{MatchCell, SimilarityMatrix};
pub use ranking::{top_k, Ranked};
pub use similarity::{cosine_similarity, round_to, similarity_percentage};
