//! Loss evaluation: reducing predictions and targets to a single discrepancy value.
//!
//! A loss is configured in one of two representations:
//!
//! - **Aggregated** ([`AggregatedLoss`]) - a built-in distance loss that knows how to
//!   reduce itself with a mean or a weighted mean ([`Aggregation`]).
//! - **Elementwise** ([`ElementwiseLoss`]) - an arbitrary per-point function. Its values
//!   are summed and divided by the row count (unweighted) or by the total weight mass
//!   (weighted).
//!
//! Both representations are wrapped in [`LossFunction`], which exposes a single
//! [`LossFunction::compute`] entry point. The representation is chosen once when the
//! options are built and never changes during a search.
//!
//! # Numeric Edge Cases
//!
//! A weighted reduction divides by the sum of the weights. All-zero weights therefore
//! produce NaN or infinity; nothing here clamps the result.

use std::{f64::consts::LN_2, fmt, iter, sync::Arc};

use serde::{Deserialize, Serialize};

/// How per-point losses are reduced to a scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation<'a> {
    /// Arithmetic mean over all points.
    Mean,
    /// `Σ wᵢ·lᵢ / Σ wᵢ`.
    WeightedMean(&'a [f64]),
}

/// Built-in distance losses with their own aggregation support.
///
/// Every variant is a function of the residual `r = prediction - target`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregatedLoss {
    /// `r²`
    #[default]
    L2Dist,
    /// `|r|`
    L1Dist,
    /// `|r|ᵖ`
    LpDist { p: f64 },
    /// Quadratic for `|r| ≤ δ`, linear beyond.
    Huber { delta: f64 },
    /// `ln(cosh(r))`
    LogCosh,
}

impl AggregatedLoss {
    /// Returns the loss of a single point.
    #[must_use]
    pub fn value(&self, target: f64, prediction: f64) -> f64 {
        let r = prediction - target;
        match *self {
            Self::L2Dist => r * r,
            Self::L1Dist => r.abs(),
            Self::LpDist { p } => r.abs().powf(p),
            Self::Huber { delta } => {
                let a = r.abs();
                if a <= delta {
                    0.5 * r * r
                } else {
                    delta * (a - 0.5 * delta)
                }
            }
            Self::LogCosh => {
                // ln(cosh(r)) = |r| + ln(1 + e^(-2|r|)) - ln 2, without overflowing cosh
                let a = r.abs();
                a + (-2.0 * a).exp().ln_1p() - LN_2
            }
        }
    }

    /// Reduces the losses of all points with the given aggregation.
    ///
    /// `targets` is the reference distribution and `predictions` the estimate.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[must_use]
    pub fn aggregate(&self, targets: &[f64], predictions: &[f64], agg: Aggregation<'_>) -> f64 {
        assert_eq!(targets.len(), predictions.len());
        let values = iter::zip(targets, predictions).map(|(&t, &p)| self.value(t, p));
        match agg {
            Aggregation::Mean => mean(values, targets.len()),
            Aggregation::WeightedMean(weights) => {
                assert_eq!(weights.len(), targets.len());
                let total = iter::zip(values, weights).map(|(l, w)| l * w).sum::<f64>();
                total / weights.iter().sum::<f64>()
            }
        }
    }
}

/// A loss defined pointwise on `(prediction, target)` pairs.
///
/// Implementations only need [`Self::loss`]; the weighted form defaults to scaling
/// the unweighted loss by the weight.
pub trait ElementwiseLoss: fmt::Debug + Send + Sync {
    /// Loss of a single point.
    fn loss(&self, prediction: f64, target: f64) -> f64;

    /// Loss of a single weighted point.
    fn weighted_loss(&self, prediction: f64, target: f64, weight: f64) -> f64 {
        weight * self.loss(prediction, target)
    }
}

/// Adapts a closure into an [`ElementwiseLoss`].
///
/// ```
/// use exprfit_scoring::loss::{FnLoss, LossFunction};
///
/// let loss = LossFunction::elementwise(FnLoss(|p: f64, t: f64| (p - t).abs()));
/// assert_eq!(loss.compute(&[1.0, 3.0], &[2.0, 2.0], None), 1.0);
/// ```
#[derive(Clone, Copy)]
pub struct FnLoss<F>(pub F);

impl<F> fmt::Debug for FnLoss<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLoss(..)")
    }
}

impl<F> ElementwiseLoss for FnLoss<F>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn loss(&self, prediction: f64, target: f64) -> f64 {
        (self.0)(prediction, target)
    }
}

/// The configured loss, in one of its two representations.
#[derive(Debug, Clone)]
pub enum LossFunction {
    Aggregated(AggregatedLoss),
    Elementwise(Arc<dyn ElementwiseLoss>),
}

impl Default for LossFunction {
    fn default() -> Self {
        Self::Aggregated(AggregatedLoss::default())
    }
}

impl From<AggregatedLoss> for LossFunction {
    fn from(loss: AggregatedLoss) -> Self {
        Self::Aggregated(loss)
    }
}

impl LossFunction {
    /// Wraps an elementwise loss.
    pub fn elementwise<L>(loss: L) -> Self
    where
        L: ElementwiseLoss + 'static,
    {
        Self::Elementwise(Arc::new(loss))
    }

    /// Computes the loss of `predictions` against `targets`.
    ///
    /// Without weights the result is a plain mean. With weights it is normalized by
    /// the total weight mass, not by the row count.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[must_use]
    pub fn compute(&self, predictions: &[f64], targets: &[f64], weights: Option<&[f64]>) -> f64 {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "predictions and targets must have the same length"
        );
        match (self, weights) {
            (Self::Aggregated(loss), None) => {
                loss.aggregate(targets, predictions, Aggregation::Mean)
            }
            (Self::Aggregated(loss), Some(w)) => {
                loss.aggregate(targets, predictions, Aggregation::WeightedMean(w))
            }
            (Self::Elementwise(loss), None) => mean(
                iter::zip(predictions, targets).map(|(&p, &t)| loss.loss(p, t)),
                predictions.len(),
            ),
            (Self::Elementwise(loss), Some(weights)) => {
                assert_eq!(
                    weights.len(),
                    targets.len(),
                    "weights must have one entry per row"
                );
                let total = iter::zip(iter::zip(predictions, targets), weights)
                    .map(|((&p, &t), &w)| loss.weighted_loss(p, t, w))
                    .sum::<f64>();
                total / weights.iter().sum::<f64>()
            }
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean<I>(values: I, len: usize) -> f64
where
    I: Iterator<Item = f64>,
{
    values.sum::<f64>() / len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREDICTIONS: [f64; 5] = [1.0, -0.5, 3.25, 8.0, 0.0];
    const TARGETS: [f64; 5] = [1.5, 0.5, 3.0, 5.0, -2.0];

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_aggregated_matches_equivalent_elementwise() {
        let losses = [
            AggregatedLoss::L2Dist,
            AggregatedLoss::L1Dist,
            AggregatedLoss::LpDist { p: 3.0 },
            AggregatedLoss::Huber { delta: 1.0 },
            AggregatedLoss::LogCosh,
        ];
        for aggregated in losses {
            let elementwise =
                LossFunction::elementwise(FnLoss(move |p: f64, t: f64| aggregated.value(t, p)));
            let aggregated = LossFunction::from(aggregated);
            assert_close(
                aggregated.compute(&PREDICTIONS, &TARGETS, None),
                elementwise.compute(&PREDICTIONS, &TARGETS, None),
            );
        }
    }

    #[test]
    fn test_unit_weights_match_unweighted() {
        let ones = [1.0; 5];
        let aggregated = LossFunction::default();
        let elementwise = LossFunction::elementwise(FnLoss(|p: f64, t: f64| (p - t).abs()));
        for loss in [aggregated, elementwise] {
            assert_close(
                loss.compute(&PREDICTIONS, &TARGETS, Some(&ones)),
                loss.compute(&PREDICTIONS, &TARGETS, None),
            );
        }
    }

    #[test]
    fn test_weighted_mean_normalizes_by_weight_mass() {
        let loss = LossFunction::default();
        let value = loss.compute(&[1.0, 3.0], &[0.0, 0.0], Some(&[3.0, 1.0]));
        // (3·1 + 1·9) / 4
        assert_close(value, 3.0);

        let loss = LossFunction::elementwise(FnLoss(|p: f64, t: f64| (p - t).powi(2)));
        let value = loss.compute(&[1.0, 3.0], &[0.0, 0.0], Some(&[3.0, 1.0]));
        assert_close(value, 3.0);
    }

    #[test]
    fn test_elementwise_weighted_loss_can_be_overridden() {
        #[derive(Debug)]
        struct IgnoreWeights;

        impl ElementwiseLoss for IgnoreWeights {
            fn loss(&self, prediction: f64, target: f64) -> f64 {
                (prediction - target).abs()
            }

            fn weighted_loss(&self, prediction: f64, target: f64, _weight: f64) -> f64 {
                self.loss(prediction, target)
            }
        }

        let loss = LossFunction::elementwise(IgnoreWeights);
        // Σ|r| = 3, divided by Σw = 6 rather than by the row count
        let value = loss.compute(&[1.0, 2.0], &[0.0, 0.0], Some(&[2.0, 4.0]));
        assert_close(value, 0.5);
    }

    #[test]
    fn test_exact_match_is_zero() {
        let y = [2.0, 4.0, 6.0, 8.0];
        for loss in [
            AggregatedLoss::L2Dist,
            AggregatedLoss::L1Dist,
            AggregatedLoss::Huber { delta: 0.5 },
            AggregatedLoss::LogCosh,
        ] {
            assert_close(LossFunction::from(loss).compute(&y, &y, None), 0.0);
        }
    }

    #[test]
    fn test_huber_switches_to_linear() {
        let huber = AggregatedLoss::Huber { delta: 1.0 };
        assert_close(huber.value(0.0, 0.5), 0.125);
        assert_close(huber.value(0.0, 3.0), 2.5);
    }

    #[test]
    fn test_log_cosh_is_stable_for_large_residuals() {
        let value = AggregatedLoss::LogCosh.value(0.0, 1000.0);
        assert!(value.is_finite());
        assert_close(value, 1000.0 - LN_2);
    }

    #[test]
    fn test_zero_weight_sum_is_not_clamped() {
        let value = LossFunction::default().compute(&[1.0], &[0.0], Some(&[0.0]));
        assert!(value.is_nan());
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch_panics() {
        let _ = LossFunction::default().compute(&[1.0, 2.0], &[1.0], None);
    }

    #[test]
    fn test_aggregated_loss_config_format() {
        let loss: AggregatedLoss = serde_json::from_str(r#"{"kind":"huber","delta":2.0}"#).unwrap();
        assert_eq!(loss, AggregatedLoss::Huber { delta: 2.0 });
        let loss: AggregatedLoss = serde_json::from_str(r#"{"kind":"l2_dist"}"#).unwrap();
        assert_eq!(loss, AggregatedLoss::L2Dist);
    }
}
