//! Top-K selection.
//!
//! Ordering is descending by score with ties broken by ascending index, the
//! result a stable descending sort would give. NaN scores rank below every
//! number. Selection keeps a bounded heap of `k` entries, so ranking `n`
//! candidates costs `O(n log k)`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

/// A candidate's position in the scored input and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranked {
    /// Index into the scored input.
    pub index: usize,
    /// Similarity percentage.
    pub score: f64,
}

impl Ranked {
    /// `Less` when `self` ranks ahead of `other`.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        sort_key(other.score)
            .total_cmp(&sort_key(self.score))
            .then(self.index.cmp(&other.index))
    }
}

// Adding +0.0 folds -0.0 into +0.0 so `total_cmp` treats them as a tie.
fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score + 0.0
    }
}

/// Heap entry ordered so the worst-ranked candidate sits on top.
struct Worst(Ranked);

impl PartialEq for Worst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Worst {}

impl PartialOrd for Worst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Worst {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Select the `k` best `(index, score)` pairs, best first.
///
/// Indices must be unique; they decide ties.
pub fn select_top<I>(scored: I, k: usize) -> Vec<Ranked>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Worst> = BinaryHeap::new();
    for (index, score) in scored {
        let candidate = Ranked { index, score };
        if heap.len() < k {
            heap.push(Worst(candidate));
        } else if let Some(worst) = heap.peek() {
            if candidate.rank_cmp(&worst.0) == Ordering::Less {
                heap.pop();
                heap.push(Worst(candidate));
            }
        }
    }

    heap.into_sorted_vec().into_iter().map(|w| w.0).collect()
}

/// The `k` highest scores, best first, ties in input order.
///
/// Returns every item when `k` exceeds `scores.len()`.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::top_k;
///
/// let ranked = top_k(&[10.0, 50.0, 30.0, 50.0], 3);
/// let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
/// assert_eq!(order, vec![1, 3, 2]);
///
/// assert_eq!(top_k(&[1.0, 2.0], 10).len(), 2);
/// ```
pub fn top_k(scores: &[f64], k: usize) -> Vec<Ranked> {
    select_top(scores.iter().copied().enumerate(), k)
}
