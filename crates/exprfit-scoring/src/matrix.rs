//! Dense feature matrices in (features × rows) layout.
//!
//! Each feature occupies one contiguous row of storage, so `feature(i)` is a
//! plain slice. A single sample (all features of one data row) is a strided
//! column and is exposed through [`FeatureMatrix::sample`].

use std::iter;

/// Error returned when building a [`FeatureMatrix`] from ragged input.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("feature {feature} has {actual} rows, expected {expected}")]
pub struct RaggedFeaturesError {
    pub feature: usize,
    pub expected: usize,
    pub actual: usize,
}

/// A dense matrix of `n_features` rows by `n_rows` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_features: usize,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Creates a matrix from one vector per feature.
    ///
    /// All features must have the same length; that length becomes the row count.
    /// An empty feature list yields a matrix with zero features and zero rows.
    pub fn from_features<I, F>(features: I) -> Result<Self, RaggedFeaturesError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[f64]>,
    {
        let mut data = vec![];
        let mut n_features = 0;
        let mut n_rows = None;
        for (i, feature) in features.into_iter().enumerate() {
            let feature = feature.as_ref();
            let expected = *n_rows.get_or_insert(feature.len());
            if feature.len() != expected {
                return Err(RaggedFeaturesError {
                    feature: i,
                    expected,
                    actual: feature.len(),
                });
            }
            data.extend_from_slice(feature);
            n_features += 1;
        }
        Ok(Self {
            data,
            n_features,
            n_rows: n_rows.unwrap_or(0),
        })
    }

    /// Creates a matrix from flat feature-major storage.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_features * n_rows`.
    #[must_use]
    pub fn from_raw(data: Vec<f64>, n_features: usize, n_rows: usize) -> Self {
        assert_eq!(
            data.len(),
            n_features * n_rows,
            "storage length does not match {n_features}x{n_rows}"
        );
        Self {
            data,
            n_features,
            n_rows,
        }
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns all values of feature `i`, one per row.
    #[must_use]
    pub fn feature(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_rows..(i + 1) * self.n_rows]
    }

    /// Iterates over the features in order.
    pub fn features(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.n_features).map(|i| self.feature(i))
    }

    /// Iterates over all feature values of row `j`.
    pub fn sample(&self, j: usize) -> impl ExactSizeIterator<Item = f64> + '_ {
        assert!(j < self.n_rows, "row {j} out of bounds ({})", self.n_rows);
        self.data.iter().skip(j).step_by(self.n_rows.max(1)).copied()
    }

    /// Returns the matrix transposed into row-major samples.
    ///
    /// The result holds `n_rows` chunks of `n_features` values each.
    #[must_use]
    pub fn to_samples(&self) -> Vec<f64> {
        let mut samples = vec![0.0; self.data.len()];
        for (i, feature) in self.features().enumerate() {
            for (j, v) in feature.iter().enumerate() {
                samples[j * self.n_features + i] = *v;
            }
        }
        samples
    }

    /// Stacks the features of `other` below the features of `self`.
    ///
    /// # Panics
    ///
    /// Panics if the row counts differ.
    #[must_use]
    pub fn stack(&self, other: &FeatureMatrix) -> FeatureMatrix {
        assert_eq!(
            self.n_rows, other.n_rows,
            "cannot stack matrices with different row counts"
        );
        let data = iter::chain(&self.data, &other.data).copied().collect();
        FeatureMatrix {
            data,
            n_features: self.n_features + other.n_features,
            n_rows: self.n_rows,
        }
    }

    /// Returns a copy of `self` with `values` appended as a new last feature.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the row count.
    #[must_use]
    pub fn with_feature(&self, values: &[f64]) -> FeatureMatrix {
        assert_eq!(
            self.n_rows,
            values.len(),
            "appended feature must have one value per row"
        );
        let mut data = Vec::with_capacity(self.data.len() + values.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(values);
        FeatureMatrix {
            data,
            n_features: self.n_features + 1,
            n_rows: self.n_rows,
        }
    }

    /// Gathers the given rows (in the given order) into a new matrix.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        let data = self
            .features()
            .flat_map(|feature| indices.iter().map(|&j| feature[j]))
            .collect();
        FeatureMatrix {
            data,
            n_features: self.n_features,
            n_rows: indices.len(),
        }
    }
}
