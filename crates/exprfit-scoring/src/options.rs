//! Scoring options and the serializable configuration they are built from.
//!
//! [`ScoringOptions`] is what the scoring functions consume. It may hold an arbitrary
//! elementwise loss, so it cannot be deserialized directly; [`ScoringConfig`] is the
//! on-disk form, restricted to the built-in aggregated losses.
//!
//! # Example
//!
//! ```
//! use exprfit_scoring::options::ScoringConfig;
//!
//! let config: ScoringConfig = serde_json::from_str(
//!     r#"{ "loss": { "kind": "l1_dist" }, "parsimony": 0.01 }"#,
//! )
//! .unwrap();
//! let options = config.into_options();
//! assert_eq!(options.parsimony, 0.01);
//! assert!(!options.noisy_nodes);
//! ```

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    loss::{AggregatedLoss, LossFunction},
};

/// Seeds used by noisy-node evaluation, one noise block per seed.
pub const NOISE_SEEDS: RangeInclusive<u64> = 1..=5;

/// Options read by the scoring functions.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub loss: LossFunction,
    /// Weight of tree complexity in the score.
    pub parsimony: f64,
    /// Score by distributional similarity under injected noise features.
    pub noisy_nodes: bool,
    /// Number of noise features stacked below the real ones.
    pub noise_features: usize,
    /// Denominator of the squared-exponential kernel exponent.
    pub kernel_bandwidth: f64,
    /// Score on a random subsample instead of the full dataset.
    pub batching: bool,
    pub batch_size: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        ScoringConfig::default().into_options()
    }
}

/// Error returned when a configuration cannot be used with a dataset.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("batch size {batch_size} is outside 1..={rows}")]
    BatchSize { batch_size: usize, rows: usize },
    #[display("noisy-node scoring does not support weighted datasets")]
    WeightedNoisyNodes,
    #[display("noisy-node scoring needs at least one row")]
    EmptyNoisyNodes,
    #[display("kernel bandwidth must be finite and positive, got {bandwidth}")]
    KernelBandwidth { bandwidth: f64 },
    #[display("parsimony must be finite and non-negative, got {parsimony}")]
    Parsimony { parsimony: f64 },
}

/// Serializable scoring configuration.
///
/// Missing fields take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub loss: AggregatedLoss,
    pub parsimony: f64,
    pub noisy_nodes: bool,
    pub noise_features: usize,
    pub kernel_bandwidth: f64,
    pub batching: bool,
    pub batch_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            loss: AggregatedLoss::default(),
            parsimony: 0.0032,
            noisy_nodes: false,
            noise_features: 1,
            kernel_bandwidth: 1.0,
            batching: false,
            batch_size: 50,
        }
    }
}

impl ScoringConfig {
    /// Checks the preconditions that the scoring functions assert on.
    ///
    /// Scoring assumes these hold and panics otherwise, so callers should
    /// validate once before starting a search.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), ConfigError> {
        if !self.parsimony.is_finite() || self.parsimony < 0.0 {
            return Err(ConfigError::Parsimony {
                parsimony: self.parsimony,
            });
        }
        if self.batching && !(1..=dataset.n_rows()).contains(&self.batch_size) {
            return Err(ConfigError::BatchSize {
                batch_size: self.batch_size,
                rows: dataset.n_rows(),
            });
        }
        if self.noisy_nodes {
            if dataset.is_weighted() {
                return Err(ConfigError::WeightedNoisyNodes);
            }
            if dataset.n_rows() == 0 {
                return Err(ConfigError::EmptyNoisyNodes);
            }
            if !self.kernel_bandwidth.is_finite() || self.kernel_bandwidth <= 0.0 {
                return Err(ConfigError::KernelBandwidth {
                    bandwidth: self.kernel_bandwidth,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn into_options(self) -> ScoringOptions {
        let Self {
            loss,
            parsimony,
            noisy_nodes,
            noise_features,
            kernel_bandwidth,
            batching,
            batch_size,
        } = self;
        ScoringOptions {
            loss: loss.into(),
            parsimony,
            noisy_nodes,
            noise_features,
            kernel_bandwidth,
            batching,
            batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::FeatureMatrix;

    fn dataset(rows: usize, weighted: bool) -> Dataset {
        let values = vec![1.0; rows];
        let x = FeatureMatrix::from_features([values.clone()]).unwrap();
        if weighted {
            Dataset::with_weights(x, values.clone(), values).unwrap()
        } else {
            Dataset::new(x, values).unwrap()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ScoringConfig::default().validate(&dataset(10, true)), Ok(()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScoringConfig = serde_json::from_str(r#"{ "batching": true }"#).unwrap();
        assert!(config.batching);
        assert_eq!(config.batch_size, ScoringConfig::default().batch_size);
        assert_eq!(config.loss, AggregatedLoss::L2Dist);
    }

    #[test]
    fn test_batch_size_must_fit_dataset() {
        let config = ScoringConfig {
            batching: true,
            batch_size: 11,
            ..ScoringConfig::default()
        };
        assert_eq!(
            config.validate(&dataset(10, false)),
            Err(ConfigError::BatchSize {
                batch_size: 11,
                rows: 10
            })
        );

        let config = ScoringConfig {
            batch_size: 0,
            ..config
        };
        assert!(config.validate(&dataset(10, false)).is_err());
    }

    #[test]
    fn test_batch_size_ignored_without_batching() {
        let config = ScoringConfig {
            batch_size: 1000,
            ..ScoringConfig::default()
        };
        assert_eq!(config.validate(&dataset(10, false)), Ok(()));
    }

    #[test]
    fn test_noisy_nodes_rejects_weighted_dataset() {
        let config = ScoringConfig {
            noisy_nodes: true,
            ..ScoringConfig::default()
        };
        assert_eq!(
            config.validate(&dataset(10, true)),
            Err(ConfigError::WeightedNoisyNodes)
        );
        assert_eq!(config.validate(&dataset(10, false)), Ok(()));
        assert_eq!(
            config.validate(&dataset(0, false)),
            Err(ConfigError::EmptyNoisyNodes)
        );
    }

    #[test]
    fn test_noisy_nodes_rejects_bad_bandwidth() {
        for bandwidth in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ScoringConfig {
                noisy_nodes: true,
                kernel_bandwidth: bandwidth,
                ..ScoringConfig::default()
            };
            assert!(matches!(
                config.validate(&dataset(4, false)),
                Err(ConfigError::KernelBandwidth { .. })
            ));
        }
    }

    #[test]
    fn test_negative_parsimony_rejected() {
        let config = ScoringConfig {
            parsimony: -0.1,
            ..ScoringConfig::default()
        };
        assert!(config.validate(&dataset(4, false)).is_err());
    }

    #[test]
    fn test_into_options_keeps_fields() {
        let config = ScoringConfig {
            loss: AggregatedLoss::L1Dist,
            parsimony: 0.5,
            noisy_nodes: true,
            noise_features: 3,
            kernel_bandwidth: 2.0,
            batching: true,
            batch_size: 7,
        };
        let options = config.into_options();
        assert!(matches!(
            options.loss,
            LossFunction::Aggregated(AggregatedLoss::L1Dist)
        ));
        assert_eq!(options.parsimony, 0.5);
        assert!(options.noisy_nodes);
        assert_eq!(options.noise_features, 3);
        assert_eq!(options.kernel_bandwidth, 2.0);
        assert!(options.batching);
        assert_eq!(options.batch_size, 7);
    }
}
