//! Kernel maximum mean discrepancy between two samples.
//!
//! With the squared-exponential kernel `k(u, v) = exp(-‖u - v‖² / bandwidth)` and
//! samples `x`, `y` of `n` points each, the biased plug-in estimate is
//!
//! ```text
//! MMD² = (Σᵢⱼ k(xᵢ, xⱼ) + Σᵢⱼ k(yᵢ, yⱼ) - 2 Σᵢⱼ k(xᵢ, yⱼ)) / n²
//! ```
//!
//! Diagonal terms are included. The statistic is close to zero when both samples come
//! from the same distribution and grows with their mismatch.
//!
//! The three Gram sums cost `O(n² · d)`. For larger samples the rows are split into
//! contiguous chunks, one per available core, and summed on scoped threads. Partial
//! sums are combined in chunk order, so a given thread count always yields the same
//! result.

use std::{
    iter,
    num::NonZeroUsize,
    ops::{Add, Range},
    panic, thread,
};

use crate::matrix::FeatureMatrix;

/// Below this many samples the Gram sums run on the calling thread.
const PARALLEL_MIN_ROWS: usize = 256;

#[derive(Debug, Default, Clone, Copy)]
struct GramSums {
    xx: f64,
    yy: f64,
    xy: f64,
}

impl Add for GramSums {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            xx: self.xx + rhs.xx,
            yy: self.yy + rhs.yy,
            xy: self.xy + rhs.xy,
        }
    }
}

/// Computes the biased MMD² estimate between samples `x` and `y`.
///
/// Samples are columns of the (features × rows) matrices.
///
/// # Panics
///
/// Panics if the samples differ in row count or feature count, or are empty.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn mmd_loss(x: &FeatureMatrix, y: &FeatureMatrix, bandwidth: f64) -> f64 {
    assert_eq!(
        x.n_rows(),
        y.n_rows(),
        "samples must have the same number of rows"
    );
    assert_eq!(
        x.n_features(),
        y.n_features(),
        "samples must have the same number of features"
    );
    assert!(x.n_rows() > 0, "samples must not be empty");
    assert!(x.n_features() > 0, "samples must have at least one feature");

    let n = x.n_rows();
    let dim = x.n_features();
    let xs = x.to_samples();
    let ys = y.to_samples();

    let sums = if n < PARALLEL_MIN_ROWS {
        gram_sums(&xs, &ys, dim, 0..n, bandwidth)
    } else {
        parallel_gram_sums(&xs, &ys, dim, bandwidth)
    };

    let n2 = (n * n) as f64;
    (sums.xx + sums.yy - 2.0 * sums.xy) / n2
}

fn parallel_gram_sums(xs: &[f64], ys: &[f64], dim: usize, bandwidth: f64) -> GramSums {
    let n = xs.len() / dim;
    let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let chunk = n.div_ceil(threads);
    thread::scope(|s| {
        let handles = (0..n)
            .step_by(chunk)
            .map(|start| {
                let rows = start..usize::min(start + chunk, n);
                s.spawn(move || gram_sums(xs, ys, dim, rows, bandwidth))
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .fold(GramSums::default(), Add::add)
    })
}

/// Sums the Gram matrix entries of the given rows against all columns.
fn gram_sums(xs: &[f64], ys: &[f64], dim: usize, rows: Range<usize>, bandwidth: f64) -> GramSums {
    let mut sums = GramSums::default();
    for i in rows {
        let xi = &xs[i * dim..(i + 1) * dim];
        let yi = &ys[i * dim..(i + 1) * dim];
        for (xj, yj) in iter::zip(xs.chunks_exact(dim), ys.chunks_exact(dim)) {
            sums.xx += kernel(xi, xj, bandwidth);
            sums.yy += kernel(yi, yj, bandwidth);
            sums.xy += kernel(xi, yj, bandwidth);
        }
    }
    sums
}

#[inline]
fn kernel(u: &[f64], v: &[f64], bandwidth: f64) -> f64 {
    let sq_dist = iter::zip(u, v).map(|(a, b)| (a - b).powi(2)).sum::<f64>();
    (-sq_dist / bandwidth).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(features: &[&[f64]]) -> FeatureMatrix {
        FeatureMatrix::from_features(features.iter().copied()).unwrap()
    }

    /// Deterministic pseudo-data without pulling in an RNG.
    fn wave(n: usize, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                #[expect(clippy::cast_precision_loss)]
                let t = i as f64;
                (t * 0.37 + phase).sin() * 2.0
            })
            .collect()
    }

    #[test]
    fn test_identical_samples_are_zero() {
        let x = sample(&[&[0.0, 1.0, 2.5, -3.0], &[1.0, 1.0, 0.0, 4.0]]);
        assert!(mmd_loss(&x, &x, 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let x = sample(&[&[0.0, 1.0, 2.5, -3.0], &[1.0, 1.0, 0.0, 4.0]]);
        let y = sample(&[&[0.5, 1.0, 2.0, -1.0], &[1.0, 3.0, 0.0, 4.5]]);
        let xy = mmd_loss(&x, &y, 2.0);
        let yx = mmd_loss(&y, &x, 2.0);
        assert!((xy - yx).abs() < 1e-12, "{xy} != {yx}");
    }

    #[test]
    fn test_grows_with_mismatch() {
        let x = sample(&[&[0.0, 1.0, 2.0, 3.0]]);
        let near = sample(&[&[0.1, 1.1, 2.1, 3.1]]);
        let far = sample(&[&[5.0, 6.0, 7.0, 8.0]]);
        let d_near = mmd_loss(&x, &near, 1.0);
        let d_far = mmd_loss(&x, &far, 1.0);
        assert!(d_near > 0.0);
        assert!(d_far > d_near);
    }

    #[test]
    fn test_single_point_matches_closed_form() {
        // n = 1: (1 + 1 - 2·exp(-d²/h)) / 1
        let x = sample(&[&[0.0]]);
        let y = sample(&[&[2.0]]);
        let expected = 2.0 - 2.0 * (-4.0_f64 / 2.0).exp();
        assert!((mmd_loss(&x, &y, 2.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let n = PARALLEL_MIN_ROWS + 17;
        let x = FeatureMatrix::from_features([wave(n, 0.0), wave(n, 1.0)]).unwrap();
        let y = FeatureMatrix::from_features([wave(n, 0.3), wave(n, 1.2)]).unwrap();
        let dim = x.n_features();
        let (xs, ys) = (x.to_samples(), y.to_samples());

        let sequential = gram_sums(&xs, &ys, dim, 0..n, 1.5);
        let parallel = parallel_gram_sums(&xs, &ys, dim, 1.5);
        for (a, b) in [
            (sequential.xx, parallel.xx),
            (sequential.yy, parallel.yy),
            (sequential.xy, parallel.xy),
        ] {
            assert!((a - b).abs() < 1e-9 * a.abs().max(1.0), "{a} != {b}");
        }
    }

    #[test]
    #[should_panic(expected = "same number of rows")]
    fn test_row_mismatch_panics() {
        let x = sample(&[&[0.0, 1.0]]);
        let y = sample(&[&[0.0]]);
        let _ = mmd_loss(&x, &y, 1.0);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_empty_samples_panic() {
        let x = sample(&[&[]]);
        let _ = mmd_loss(&x, &x, 1.0);
    }
}
