//! Training data scored against candidate trees.

use crate::matrix::FeatureMatrix;

/// Error returned when the parts of a [`Dataset`] disagree on the row count.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("feature matrix has {features} rows but target has {targets}")]
    TargetLength { features: usize, targets: usize },
    #[display("target has {targets} rows but weights have {weights}")]
    WeightLength { targets: usize, weights: usize },
}

/// Features, targets and optional per-row weights.
///
/// The dataset is read-only once built; scoring calls borrow it and may run
/// concurrently on the same instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: FeatureMatrix,
    y: Vec<f64>,
    weights: Option<Vec<f64>>,
}

impl Dataset {
    /// Creates an unweighted dataset.
    pub fn new(x: FeatureMatrix, y: Vec<f64>) -> Result<Self, DatasetError> {
        if x.n_rows() != y.len() {
            return Err(DatasetError::TargetLength {
                features: x.n_rows(),
                targets: y.len(),
            });
        }
        Ok(Self {
            x,
            y,
            weights: None,
        })
    }

    /// Creates a weighted dataset.
    ///
    /// Every weight takes part in loss computation; none are merely stored.
    pub fn with_weights(
        x: FeatureMatrix,
        y: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(x, y)?;
        if weights.len() != dataset.y.len() {
            return Err(DatasetError::WeightLength {
                targets: dataset.y.len(),
                weights: weights.len(),
            });
        }
        dataset.weights = Some(weights);
        Ok(dataset)
    }

    #[must_use]
    pub fn x(&self) -> &FeatureMatrix {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    #[must_use]
    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.y.len()
    }

    /// Restricts features, targets and weights to the given rows.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        let gather = |values: &[f64]| indices.iter().map(|&i| values[i]).collect::<Vec<_>>();
        Dataset {
            x: self.x.select_rows(indices),
            y: gather(&self.y),
            weights: self.weights.as_deref().map(gather),
        }
    }
}
