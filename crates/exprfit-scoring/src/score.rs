//! Full-dataset scoring: tree evaluation, loss selection and score composition.
//!
//! ```text
//! score = loss / baseline + parsimony × complexity(tree)
//! ```
//!
//! Lower is better for both the loss and the score. A tree whose evaluation does not
//! complete gets [`INVALID_LOSS`] instead of an error, which keeps every score finite
//! and totally ordered for the search loop.
//!
//! Neither a zero baseline nor a zero weight sum is guarded against; both propagate
//! as infinity or NaN.

use crate::{
    batch,
    candidate::CandidateTree,
    dataset::Dataset,
    noisy,
    options::ScoringOptions,
};

/// Loss (and score) assigned to trees whose evaluation did not complete.
pub const INVALID_LOSS: f64 = 1e9;

/// Score and raw loss of a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fitness {
    pub score: f64,
    pub loss: f64,
}

impl Fitness {
    /// Fitness of a tree that could not be evaluated.
    pub const INVALID: Self = Self {
        score: INVALID_LOSS,
        loss: INVALID_LOSS,
    };
}

/// Computes the loss of `tree` on the whole dataset.
///
/// Dispatches to noisy-node scoring when it is enabled, otherwise evaluates the tree
/// once and applies the configured loss (weighted if the dataset carries weights).
///
/// # Panics
///
/// Panics if noisy-node scoring is enabled on a weighted dataset.
#[must_use]
pub fn eval_loss<T>(tree: &T, dataset: &Dataset, options: &ScoringOptions) -> f64
where
    T: CandidateTree + ?Sized,
{
    if options.noisy_nodes {
        return noisy::eval_loss_noisy_nodes(tree, dataset, options);
    }
    let evaluation = tree.evaluate(dataset.x(), options);
    if !evaluation.completed {
        return INVALID_LOSS;
    }
    options
        .loss
        .compute(&evaluation.prediction, dataset.y(), dataset.weights())
}

/// Normalizes `loss` by `baseline` and adds the complexity penalty.
#[must_use]
pub fn loss_to_score<T>(loss: f64, baseline: f64, tree: &T, options: &ScoringOptions) -> f64
where
    T: CandidateTree + ?Sized,
{
    loss / baseline + options.parsimony * tree.complexity(options)
}

/// Scores `tree` on the full dataset.
#[must_use]
pub fn score_func<T>(dataset: &Dataset, baseline: f64, tree: &T, options: &ScoringOptions) -> Fitness
where
    T: CandidateTree + ?Sized,
{
    let loss = eval_loss(tree, dataset, options);
    let score = loss_to_score(loss, baseline, tree, options);
    Fitness { score, loss }
}

/// Scores `tree` on a random batch when batching is enabled, on the full dataset otherwise.
#[must_use]
pub fn score_candidate<T>(
    dataset: &Dataset,
    baseline: f64,
    tree: &T,
    options: &ScoringOptions,
) -> Fitness
where
    T: CandidateTree + ?Sized,
{
    if options.batching {
        batch::score_func_batch(dataset, baseline, tree, options)
    } else {
        score_func(dataset, baseline, tree, options)
    }
}

/// Loss of the constant predictor that always outputs the mean target.
///
/// The mean is weighted when the dataset is. This is the usual `baseline` for
/// [`loss_to_score`]; it is not clamped away from zero.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn baseline_loss(dataset: &Dataset, options: &ScoringOptions) -> f64 {
    let y = dataset.y();
    let mean = match dataset.weights() {
        Some(w) => {
            std::iter::zip(y, w).map(|(y, w)| y * w).sum::<f64>() / w.iter().sum::<f64>()
        }
        None => y.iter().sum::<f64>() / y.len() as f64,
    };
    let prediction = vec![mean; y.len()];
    options.loss.compute(&prediction, y, dataset.weights())
}
