//! The contract between the scoring core and candidate expression trees.
//!
//! Trees are built, evaluated and measured elsewhere. Scoring only needs to run a
//! tree on a feature matrix and ask for its size.

use std::fmt;

use crate::{matrix::FeatureMatrix, options::ScoringOptions};

/// Result of evaluating a tree on a feature matrix.
///
/// When `completed` is false the prediction contents are unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub prediction: Vec<f64>,
    pub completed: bool,
}

impl Evaluation {
    #[must_use]
    pub fn completed(prediction: Vec<f64>) -> Self {
        Self {
            prediction,
            completed: true,
        }
    }

    /// An evaluation that hit a domain error, overflow or similar.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            prediction: vec![],
            completed: false,
        }
    }
}

/// A candidate expression tree that can be scored.
///
/// Implementations must report numerically invalid evaluations through
/// [`Evaluation::completed`] being false rather than by panicking. Both methods
/// may be called concurrently from many threads.
pub trait CandidateTree: fmt::Debug + Send + Sync {
    /// Evaluates the tree on every row of `x`, producing one prediction per row.
    fn evaluate(&self, x: &FeatureMatrix, options: &ScoringOptions) -> Evaluation;

    /// Returns the non-negative size of the tree.
    ///
    /// Larger trees must not have a smaller complexity than their subtrees.
    fn complexity(&self, options: &ScoringOptions) -> f64;
}
