//! The call × site similarity matrix.

use std::time::Instant;

use fundmatch_core::{FundingCall, Site};
use serde::Serialize;

use crate::ranking::{select_top, Ranked};
use crate::similarity::{cosine_with_norms, matrix_percentage, norm};

/// One cell of the similarity matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCell {
    pub site: usize,
    pub call: usize,
    pub score: f64,
}

/// Similarity percentages indexed `[site][call]`, stored row-major.
///
/// Each cell holds the cosine similarity of a site's summary embedding and a
/// call's title embedding, rounded to three decimals and scaled by 100.
/// Built once and never mutated.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::SimilarityMatrix;
///
/// let calls: [&[f32]; 2] = [&[1.0, 0.0], &[0.0, 1.0]];
/// let sites: [&[f32]; 1] = [&[1.0, 0.0]];
/// let matrix = SimilarityMatrix::from_embeddings(&calls, &sites);
///
/// assert_eq!(matrix.shape(), (1, 2));
/// assert_eq!(matrix.get(0, 0), Some(100.0));
/// assert_eq!(matrix.get(0, 1), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    sites: usize,
    calls: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build the matrix from the dataset's calls and sites.
    pub fn build(calls: &[FundingCall], sites: &[Site]) -> Self {
        let call_vecs: Vec<&[f32]> = calls.iter().map(|c| c.title_embedding.as_slice()).collect();
        let site_vecs: Vec<&[f32]> = sites
            .iter()
            .map(|s| s.summary_embedding.as_slice())
            .collect();
        Self::from_embeddings(&call_vecs, &site_vecs)
    }

    /// Build the matrix from raw embeddings.
    pub fn from_embeddings(calls: &[&[f32]], sites: &[&[f32]]) -> Self {
        let started = Instant::now();
        let call_norms: Vec<f64> = calls.iter().map(|c| norm(c)).collect();

        let mut values = Vec::with_capacity(sites.len() * calls.len());
        for site in sites {
            let site_norm = norm(site);
            for (call, &call_norm) in calls.iter().zip(&call_norms) {
                let cosine = if site.len() == call.len() {
                    cosine_with_norms(site, call, site_norm, call_norm)
                } else {
                    0.0
                };
                values.push(matrix_percentage(cosine));
            }
        }

        log::debug!(
            "built {}x{} similarity matrix in {:?}",
            sites.len(),
            calls.len(),
            started.elapsed()
        );

        Self {
            sites: sites.len(),
            calls: calls.len(),
            values,
        }
    }

    /// `(sites, calls)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.sites, self.calls)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, site: usize, call: usize) -> Option<f64> {
        if site >= self.sites || call >= self.calls {
            return None;
        }
        self.values.get(site * self.calls + call).copied()
    }

    /// Scores of one site against every call.
    pub fn row(&self, site: usize) -> Option<&[f64]> {
        if site >= self.sites {
            return None;
        }
        let start = site * self.calls;
        Some(&self.values[start..start + self.calls])
    }

    /// Scores of every site against one call.
    pub fn column(&self, call: usize) -> Option<Vec<f64>> {
        if call >= self.calls {
            return None;
        }
        Some(
            self.values
                .iter()
                .skip(call)
                .step_by(self.calls)
                .copied()
                .collect(),
        )
    }

    /// Convert a row-major flat index to `(site, call)`.
    pub(crate) fn unravel(&self, flat: usize) -> (usize, usize) {
        (flat / self.calls, flat % self.calls)
    }

    /// Best-matching sites for `call`; `Ranked::index` is a site index.
    pub fn top_sites_for_call(&self, call: usize, k: usize) -> Option<Vec<Ranked>> {
        let column = self.column(call)?;
        Some(select_top(column.into_iter().enumerate(), k))
    }

    /// Best-matching calls for `site`; `Ranked::index` is a call index.
    pub fn top_calls_for_site(&self, site: usize, k: usize) -> Option<Vec<Ranked>> {
        let row = self.row(site)?;
        Some(select_top(row.iter().copied().enumerate(), k))
    }

    /// The `k` best cells across the whole matrix, best first.
    ///
    /// Ties are broken by row-major position. This scans every cell; run it
    /// off the interactive path for large matrices.
    pub fn top_cells(&self, k: usize) -> Vec<MatchCell> {
        select_top(self.values.iter().copied().enumerate(), k)
            .into_iter()
            .map(|ranked| {
                let (site, call) = self.unravel(ranked.index);
                MatchCell {
                    site,
                    call,
                    score: ranked.score,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(calls: &[&[f32]], sites: &[&[f32]]) -> SimilarityMatrix {
        SimilarityMatrix::from_embeddings(calls, sites)
    }

    #[test]
    fn identical_vectors_score_hundred() {
        let m = matrix(&[&[1.0, 0.0]], &[&[1.0, 0.0]]);
        assert_eq!(m.get(0, 0), Some(100.0));
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let m = matrix(&[&[1.0, 0.0]], &[&[0.0, 1.0]]);
        assert_eq!(m.get(0, 0), Some(0.0));
    }

    #[test]
    fn stores_three_decimal_cosine() {
        // cos = 1/sqrt(2) = 0.70710..., stored as 70.7
        let m = matrix(&[&[1.0, 1.0]], &[&[1.0, 0.0]]);
        assert_eq!(m.get(0, 0), Some(70.7));
    }

    #[test]
    fn zero_site_vector_scores_zero() {
        let m = matrix(&[&[1.0, 0.0]], &[&[0.0, 0.0]]);
        assert_eq!(m.get(0, 0), Some(0.0));
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let m = matrix(&[&[1.0, 0.0], &[0.0, 1.0]], &[&[1.0, 0.0]]);
        assert_eq!(m.shape(), (1, 2));
        assert!(m.get(1, 0).is_none());
        assert!(m.get(0, 2).is_none());
        assert!(m.row(1).is_none());
        assert!(m.column(2).is_none());
        assert!(m.top_sites_for_call(5, 3).is_none());
    }

    #[test]
    fn rows_and_columns() {
        let m = matrix(
            &[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]],
            &[&[1.0, 0.0], &[0.0, 1.0]],
        );
        assert_eq!(m.row(0).unwrap(), &[100.0, 0.0, 70.7]);
        assert_eq!(m.row(1).unwrap(), &[0.0, 100.0, 70.7]);
        assert_eq!(m.column(2).unwrap(), vec![70.7, 70.7]);
    }

    #[test]
    fn top_sites_for_call_ranks_column() {
        let m = matrix(
            &[&[1.0, 0.0]],
            &[&[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]],
        );
        let ranked = m.top_sites_for_call(0, 10).unwrap();
        let sites: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(sites, vec![1, 2, 0]);
    }

    #[test]
    fn top_calls_for_site_respects_k() {
        let m = matrix(
            &[&[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]],
            &[&[1.0, 0.0]],
        );
        let ranked = m.top_calls_for_site(0, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].index, 2);
    }

    #[test]
    fn unravel_is_row_major() {
        let m = matrix(&[&[1.0], &[1.0], &[1.0]], &[&[1.0], &[1.0]]);
        assert_eq!(m.unravel(0), (0, 0));
        assert_eq!(m.unravel(2), (0, 2));
        assert_eq!(m.unravel(4), (1, 1));
    }

    #[test]
    fn top_cells_are_non_increasing_and_unraveled() {
        let m = matrix(
            &[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]],
            &[&[1.0, 0.0], &[0.0, 1.0], &[0.2, 1.0]],
        );
        let cells = m.top_cells(5);
        assert_eq!(cells.len(), 5);
        assert!(cells.windows(2).all(|w| w[0].score >= w[1].score));
        for cell in &cells {
            assert_eq!(m.get(cell.site, cell.call), Some(cell.score));
        }
        // Two exact 100.0 cells; row-major order decides the tie.
        assert_eq!((cells[0].site, cells[0].call), (0, 0));
        assert_eq!((cells[1].site, cells[1].call), (1, 1));
    }

    #[test]
    fn top_cells_with_large_k_returns_every_cell() {
        let m = matrix(&[&[1.0, 0.0], &[0.0, 1.0]], &[&[1.0, 0.0]]);
        assert_eq!(m.top_cells(100).len(), 2);
        assert!(m.top_cells(0).is_empty());
    }

    #[test]
    fn empty_matrix() {
        let m = matrix(&[], &[]);
        assert!(m.is_empty());
        assert!(m.top_cells(3).is_empty());
    }
}
