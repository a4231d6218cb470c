use exprfit_scoring::{dataset::Dataset, matrix::FeatureMatrix};
use serde::{Deserialize, Serialize};

/// On-disk dataset: one array per feature, plus targets and optional weights.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetFile {
    pub features: Vec<Vec<f64>>,
    pub target: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

impl DatasetFile {
    pub fn into_dataset(self) -> anyhow::Result<Dataset> {
        let Self {
            features,
            target,
            weights,
        } = self;
        let x = FeatureMatrix::from_features(features)?;
        let dataset = match weights {
            Some(weights) => Dataset::with_weights(x, target, weights)?,
            None => Dataset::new(x, target)?,
        };
        Ok(dataset)
    }
}
