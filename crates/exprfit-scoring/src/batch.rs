//! Stochastic scoring on a random subsample of the dataset.
//!
//! Batch scoring trades accuracy for speed during search: rows are sampled uniformly
//! without replacement and the tree is evaluated on those rows only. It always takes
//! the standard evaluation path, even when noisy-node scoring is enabled.

use rand::{Rng, seq::index};

use crate::{
    candidate::CandidateTree,
    dataset::Dataset,
    options::ScoringOptions,
    score::{Fitness, loss_to_score},
};

/// Scores `tree` on `options.batch_size` randomly chosen rows.
///
/// Uses the thread-local generator, so repeated calls see different batches.
///
/// # Panics
///
/// Panics if the batch size exceeds the number of rows.
#[must_use]
pub fn score_func_batch<T>(
    dataset: &Dataset,
    baseline: f64,
    tree: &T,
    options: &ScoringOptions,
) -> Fitness
where
    T: CandidateTree + ?Sized,
{
    score_func_batch_with_rng(dataset, baseline, tree, options, &mut rand::rng())
}

/// Like [`score_func_batch`], drawing the batch from `rng`.
///
/// A failed evaluation yields [`Fitness::INVALID`] for both the score and the loss.
///
/// # Panics
///
/// Panics if the batch size exceeds the number of rows.
#[must_use]
pub fn score_func_batch_with_rng<T, R>(
    dataset: &Dataset,
    baseline: f64,
    tree: &T,
    options: &ScoringOptions,
    rng: &mut R,
) -> Fitness
where
    T: CandidateTree + ?Sized,
    R: Rng + ?Sized,
{
    let n = dataset.n_rows();
    assert!(
        options.batch_size <= n,
        "batch size {} exceeds dataset size {n}",
        options.batch_size
    );
    let indices = index::sample(rng, n, options.batch_size).into_vec();
    let batch = dataset.subset(&indices);

    let evaluation = tree.evaluate(batch.x(), options);
    if !evaluation.completed {
        return Fitness::INVALID;
    }
    let loss = options
        .loss
        .compute(&evaluation.prediction, batch.y(), batch.weights());
    let score = loss_to_score(loss, baseline, tree, options);
    Fitness { score, loss }
}
