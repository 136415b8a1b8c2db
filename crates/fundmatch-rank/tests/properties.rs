use fundmatch_rank::{cosine_similarity, top_k, SimilarityMatrix};

/// Small deterministic pseudo-random vectors (xorshift), no external RNG.
fn vectors(seed: u64, count: usize, dims: usize) -> Vec<Vec<f32>> {
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        ((state % 2001) as f32 / 1000.0) - 1.0
    };
    (0..count)
        .map(|_| (0..dims).map(|_| next()).collect())
        .collect()
}

fn as_slices(v: &[Vec<f32>]) -> Vec<&[f32]> {
    v.iter().map(Vec::as_slice).collect()
}

#[test]
fn cosine_is_symmetric_and_bounded() {
    let vs = vectors(7, 12, 8);
    for a in &vs {
        for b in &vs {
            let ab = cosine_similarity(a, b);
            assert!((ab - cosine_similarity(b, a)).abs() < 1e-12);
            assert!((-1.0..=1.0).contains(&ab));
        }
        assert!((cosine_similarity(a, a) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn top_k_length_is_min_of_k_and_len() {
    let scores = [3.0, 1.0, 4.0, 1.0, 5.0];
    for k in 0..8 {
        let top = top_k(&scores, k);
        assert_eq!(top.len(), k.min(scores.len()));
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn global_top_cells_are_non_increasing() {
    let calls = vectors(11, 9, 6);
    let sites = vectors(23, 14, 6);
    let matrix = SimilarityMatrix::from_embeddings(&as_slices(&calls), &as_slices(&sites));

    let cells = matrix.top_cells(40);
    assert_eq!(cells.len(), 40);
    assert!(cells.windows(2).all(|w| w[0].score >= w[1].score));
    for cell in &cells {
        assert_eq!(matrix.get(cell.site, cell.call), Some(cell.score));
    }
}

#[test]
fn global_top_cells_agree_with_full_sort() {
    let calls = vectors(5, 6, 4);
    let sites = vectors(9, 7, 4);
    let matrix = SimilarityMatrix::from_embeddings(&as_slices(&calls), &as_slices(&sites));

    let mut all: Vec<(usize, usize, f64)> = (0..7)
        .flat_map(|s| (0..6).map(move |c| (s, c)))
        .filter_map(|(s, c)| matrix.get(s, c).map(|v| (s, c, v)))
        .collect();
    all.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());

    let top: Vec<(usize, usize, f64)> = matrix
        .top_cells(10)
        .into_iter()
        .map(|c| (c.site, c.call, c.score))
        .collect();
    assert_eq!(top, all[..10].to_vec());
}

#[test]
fn asking_for_more_than_available_returns_everything() {
    let calls: [&[f32]; 1] = [&[1.0, 0.0]];
    let sites: [&[f32]; 2] = [&[1.0, 0.0], &[0.0, 1.0]];
    let matrix = SimilarityMatrix::from_embeddings(&calls, &sites);
    assert_eq!(matrix.top_cells(100).len(), 2);
    assert_eq!(matrix.top_cells(usize::MAX).len(), 2);
    assert_eq!(top_k(&[1.0, 2.0], usize::MAX).len(), 2);
    assert_eq!(matrix.top_sites_for_call(0, 100).unwrap().len(), 2);
    assert_eq!(matrix.top_calls_for_site(1, 100).unwrap().len(), 1);
}
