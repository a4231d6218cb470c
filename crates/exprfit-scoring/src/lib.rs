//! Fitness scoring for candidate symbolic expressions.
//!
//! This crate computes how well a candidate expression tree fits a dataset, for use
//! inside an equation-discovery search. It does not build, mutate or select trees;
//! trees are reached only through the [`CandidateTree`](candidate::CandidateTree)
//! trait, which evaluates a tree and reports its complexity.
//!
//! # Architecture
//!
//! ```text
//! score_func / score_func_batch
//!     ↓ evaluate tree (standard or noisy-node path)
//! Loss (aggregated or elementwise)   |   MMD under injected noise
//!     ↓ produces
//! Loss → loss_to_score (baseline normalization + parsimony penalty)
//!     ↓ produces
//! Fitness { score, loss }
//! ```
//!
//! # Modules
//!
//! - [`loss`] - The two loss representations and their reductions
//! - [`score`] - Full-dataset loss and score, baseline loss, sentinel for failed trees
//! - [`noisy`] - Noisy-node scoring with seeded noise features
//! - [`kernel`] - Kernel maximum mean discrepancy
//! - [`batch`] - Scoring on a random subsample
//! - [`options`] - Scoring options and their serializable configuration
//! - [`dataset`], [`matrix`] - Input data
//!
//! # Example
//!
//! ```
//! use exprfit_scoring::{
//!     candidate::{CandidateTree, Evaluation},
//!     dataset::Dataset,
//!     matrix::FeatureMatrix,
//!     options::ScoringOptions,
//!     score::{self, Fitness},
//! };
//!
//! #[derive(Debug)]
//! struct Double;
//!
//! impl CandidateTree for Double {
//!     fn evaluate(&self, x: &FeatureMatrix, _options: &ScoringOptions) -> Evaluation {
//!         Evaluation::completed(x.feature(0).iter().map(|v| 2.0 * v).collect())
//!     }
//!
//!     fn complexity(&self, _options: &ScoringOptions) -> f64 {
//!         3.0
//!     }
//! }
//!
//! let x = FeatureMatrix::from_features([[1.0, 2.0, 3.0, 4.0]]).unwrap();
//! let dataset = Dataset::new(x, vec![2.0, 4.0, 6.0, 8.0]).unwrap();
//! let options = ScoringOptions { parsimony: 0.0, ..ScoringOptions::default() };
//!
//! let fitness = score::score_func(&dataset, 1.0, &Double, &options);
//! assert_eq!(fitness, Fitness { score: 0.0, loss: 0.0 });
//! ```
//!
//! # Concurrency
//!
//! Scoring functions hold no state. They borrow the dataset and options immutably and
//! may be called from many threads at once. Noise for noisy-node scoring comes from a
//! generator rebuilt from a fixed seed on every call, so results do not depend on
//! call order.

pub mod batch;
pub mod candidate;
pub mod dataset;
pub mod kernel;
pub mod loss;
pub mod matrix;
pub mod noisy;
pub mod options;
pub mod score;
