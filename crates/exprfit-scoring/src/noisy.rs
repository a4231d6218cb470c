//! Noisy-node scoring: distributional loss under injected distractor features.
//!
//! Instead of comparing predictions to targets point by point, a candidate is judged by
//! whether `(features, prediction)` looks like a sample from the same distribution as
//! `(features, target)`, after random noise features have been appended to the input.
//!
//! For every seed in [`NOISE_SEEDS`]:
//!
//! 1. Draw a standard-normal noise block (`noise_features × rows`) from a generator
//!    seeded with exactly that seed.
//! 2. Stack the noise below the real features and evaluate the tree on the result.
//! 3. Append the target row and the prediction row to the augmented features to
//!    form the true and predicted joint samples.
//! 4. Compute [`mmd_loss`] between the predicted and the true joint samples.
//!
//! The loss is the mean over all seeds. A failed evaluation on any seed returns
//! [`INVALID_LOSS`] at once.
//!
//! Each noise block comes from a fresh generator built by [`noise_rng`], so the noise
//! for a seed is the same on every call and on every thread.

use rand::{Rng as _, SeedableRng as _};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;

use crate::{
    candidate::CandidateTree,
    dataset::Dataset,
    kernel::mmd_loss,
    matrix::FeatureMatrix,
    options::{NOISE_SEEDS, ScoringOptions},
    score::INVALID_LOSS,
};

/// Builds the generator for one noise block.
#[must_use]
pub fn noise_rng(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}

/// Draws a (`n_features` × `n_rows`) block of standard-normal noise.
#[must_use]
pub fn noise_block(seed: u64, n_features: usize, n_rows: usize) -> FeatureMatrix {
    let mut rng = noise_rng(seed);
    let data = (0..n_features * n_rows)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    FeatureMatrix::from_raw(data, n_features, n_rows)
}

/// Computes the seed-averaged MMD loss of `tree` on `dataset`.
///
/// # Panics
///
/// Panics if the dataset is weighted or has no rows.
#[must_use]
pub fn eval_loss_noisy_nodes<T>(tree: &T, dataset: &Dataset, options: &ScoringOptions) -> f64
where
    T: CandidateTree + ?Sized,
{
    assert!(
        !dataset.is_weighted(),
        "noisy-node scoring does not support weighted datasets"
    );

    let mut total = 0.0;
    let mut count = 0.0;
    for seed in NOISE_SEEDS {
        let noise = noise_block(seed, options.noise_features, dataset.n_rows());
        let augmented = dataset.x().stack(&noise);
        let evaluation = tree.evaluate(&augmented, options);
        if !evaluation.completed {
            return INVALID_LOSS;
        }
        let true_joint = augmented.with_feature(dataset.y());
        let predicted_joint = augmented.with_feature(&evaluation.prediction);
        total += mmd_loss(&predicted_joint, &true_joint, options.kernel_bandwidth);
        count += 1.0;
    }
    total / count
}
