//! Cosine similarity and percentage scaling.
//!
//! Similarity is accumulated in `f64` regardless of the `f32` storage of
//! embeddings. Zero-magnitude, empty, or length-mismatched inputs have a
//! similarity of `0.0` rather than NaN.

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0_f64, |acc, (&x, &y)| (x as f64).mul_add(y as f64, acc))
}

/// Euclidean norm.
pub fn norm(v: &[f32]) -> f64 {
    v.iter()
        .fold(0.0_f64, |acc, &x| (x as f64).mul_add(x as f64, acc))
        .sqrt()
}

/// Cosine of the angle between `a` and `b`, in `[-1.0, 1.0]`.
///
/// Returns `0.0` when either vector has zero magnitude, when either is
/// empty, or when their lengths differ.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::cosine_similarity;
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    cosine_with_norms(a, b, norm(a), norm(b))
}

/// Cosine similarity with precomputed norms, used when one side is reused
/// across many comparisons.
pub(crate) fn cosine_with_norms(a: &[f32], b: &[f32], norm_a: f64, norm_b: f64) -> f64 {
    let denom = norm_a * norm_b;
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}

/// Cosine similarity scaled to a percentage, unrounded.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::similarity_percentage;
///
/// let p = similarity_percentage(&[1.0, 1.0], &[1.0, 0.0]);
/// assert!((p - 70.7107).abs() < 1e-3);
/// ```
pub fn similarity_percentage(a: &[f32], b: &[f32]) -> f64 {
    cosine_similarity(a, b) * 100.0
}

/// The value stored in the similarity matrix: the cosine rounded to three
/// decimals, then scaled to a percentage (`0.8766` becomes `87.7`).
pub fn matrix_percentage(cosine: f64) -> f64 {
    (cosine * 1000.0).round() / 10.0
}

/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use fundmatch_rank::round_to;
///
/// assert_eq!(round_to(87.66, 1), 87.7);
/// assert_eq!(round_to(0.12345, 3), 0.123);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn self_similarity_is_one() {
        let vectors: [&[f32]; 4] = [
            &[1.0, 0.0],
            &[0.3, -0.7, 2.5],
            &[1e-3, 1e-3, 1e-3, 1e-3],
            &[-4.0, 9.0, 0.5, 0.25, 100.0],
        ];
        for v in vectors {
            assert!((cosine_similarity(v, v) - 1.0).abs() < EPS, "{v:?}");
        }
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = [0.1_f32, 0.7, -0.2, 0.4];
        let b = [0.9_f32, -0.1, 0.3, 0.05];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < EPS);
    }

    #[test]
    fn magnitude_does_not_matter() {
        let a = [1.0_f32, 2.0, 3.0];
        let b = [10.0_f32, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_vector_gives_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn empty_and_mismatched_give_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn percentage_examples() {
        assert_eq!(similarity_percentage(&[1.0, 0.0], &[1.0, 0.0]), 100.0);
        assert_eq!(similarity_percentage(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn matrix_percentage_rounds_cosine_first() {
        assert_eq!(matrix_percentage(0.8766), 87.7);
        assert_eq!(matrix_percentage(0.12349), 12.3);
        assert_eq!(matrix_percentage(1.0), 100.0);
        assert_eq!(matrix_percentage(0.0), 0.0);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(-12.25, 1), -12.3);
        assert_eq!(round_to(5.0, 1), 5.0);
    }
}
