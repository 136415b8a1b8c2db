//! Competency alignment: how strongly a call or site embedding points toward
//! each term of a fixed vocabulary.

use serde::Serialize;

use crate::ranking::select_top;
use crate::similarity::{cosine_with_norms, norm};

/// A vocabulary term and its embedding.
#[derive(Debug, Clone)]
pub struct Competency {
    pub label: String,
    pub embedding: Vec<f32>,
    norm: f64,
}

impl Competency {
    pub fn new(label: impl Into<String>, embedding: Vec<f32>) -> Self {
        let norm = norm(&embedding);
        Self {
            label: label.into(),
            embedding,
            norm,
        }
    }

    /// Similarity percentage (unrounded) between this competency and `embedding`.
    pub fn score(&self, embedding: &[f32]) -> f64 {
        if embedding.len() != self.embedding.len() {
            return 0.0;
        }
        cosine_with_norms(&self.embedding, embedding, self.norm, norm(embedding)) * 100.0
    }
}

/// A competency's rank entry for one embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyScore {
    /// Position of the competency in the vocabulary.
    pub index: usize,
    pub label: String,
    /// Similarity percentage, unrounded.
    pub score: f64,
}

/// The embedded competency vocabulary, in vocabulary order.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::{Competency, CompetencySet};
///
/// let set = CompetencySet::new(vec![
///     Competency::new("Robotics", vec![1.0, 0.0]),
///     Competency::new("Photonics", vec![0.0, 1.0]),
/// ]);
/// let top = set.rank(&[0.9, 0.1], 1);
/// assert_eq!(top[0].label, "Robotics");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompetencySet {
    entries: Vec<Competency>,
}

impl CompetencySet {
    pub fn new(entries: Vec<Competency>) -> Self {
        Self { entries }
    }

    /// Pair labels with their embeddings; extra items on either side are dropped.
    pub fn from_pairs(labels: &[String], embeddings: Vec<Vec<f32>>) -> Self {
        Self::new(
            labels
                .iter()
                .zip(embeddings)
                .map(|(label, embedding)| Competency::new(label.clone(), embedding))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Competency> {
        self.entries.get(index)
    }

    /// Dimensionality shared by the entries, `None` when empty or mixed.
    pub fn dimensions(&self) -> Option<usize> {
        let first = self.entries.first()?.embedding.len();
        self.entries
            .iter()
            .all(|c| c.embedding.len() == first)
            .then_some(first)
    }

    /// Score every competency against `embedding` and return the top `k`,
    /// ties in vocabulary order.
    pub fn rank(&self, embedding: &[f32], k: usize) -> Vec<CompetencyScore> {
        let target_norm = norm(embedding);
        let scores = self.entries.iter().enumerate().map(|(i, c)| {
            let score = if c.embedding.len() == embedding.len() {
                cosine_with_norms(&c.embedding, embedding, c.norm, target_norm) * 100.0
            } else {
                0.0
            };
            (i, score)
        });

        select_top(scores, k)
            .into_iter()
            .map(|ranked| CompetencyScore {
                index: ranked.index,
                label: self.entries[ranked.index].label.clone(),
                score: ranked.score,
            })
            .collect()
    }
}

/// Render `fraction` (0.0 to 1.0) as a bar of `width` cells between brackets.
///
/// The filled length is `floor(width * fraction)` clamped to `[0, width]`,
/// so negative similarities draw an empty bar.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::progress_bar;
///
/// assert_eq!(progress_bar(0.5, 4), "[██  ]");
/// assert_eq!(progress_bar(1.7, 3), "[███]");
/// assert_eq!(progress_bar(-0.2, 2), "[  ]");
/// ```
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = if fraction.is_nan() {
        0
    } else {
        ((width as f64 * fraction).floor().max(0.0) as usize).min(width)
    };
    let mut bar = String::with_capacity(width * 3 + 2);
    bar.push('[');
    bar.extend(std::iter::repeat('█').take(filled));
    bar.extend(std::iter::repeat(' ').take(width - filled));
    bar.push(']');
    bar
}
