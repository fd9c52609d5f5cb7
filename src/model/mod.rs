pub mod features;
pub mod forest;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::city::CityRecord;
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::scoring::CityAnalyzer;

pub use features::{feature_vector, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use forest::{ForestParams, RandomForest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub weight: f64,
}

/// Trains regressors that approximate the rule-based score from raw city features.
#[derive(Debug, Clone, Default)]
pub struct FeatureModel {
    config: ModelConfig,
}

impl FeatureModel {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, records: &[CityRecord], targets: &[f64]) -> Result<TrainedModel, ModelError> {
        let required = self.config.min_training_samples.max(1);
        if records.len() < required {
            return Err(ModelError::InsufficientTrainingData {
                required,
                found: records.len(),
            });
        }
        if records.len() != targets.len() {
            return Err(ModelError::TargetCountMismatch {
                records: records.len(),
                targets: targets.len(),
            });
        }
        if let Some(index) = targets.iter().position(|target| !target.is_finite()) {
            return Err(ModelError::InvalidTarget { index });
        }

        let mut samples = Vec::with_capacity(records.len());
        for record in records {
            record.validate()?;
            samples.push(feature_vector(record));
        }

        let params = ForestParams {
            trees: self.config.trees,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            seed: self.config.seed,
        };
        let forest = RandomForest::fit(&samples, targets, params);

        info!(
            samples = records.len(),
            trees = forest.tree_count(),
            "trained sustainability model"
        );

        Ok(TrainedModel {
            forest,
            training_samples: records.len(),
        })
    }

    /// Labels every record with the rule-based score, then trains on those labels.
    pub fn train_from_analyzer(
        &self,
        analyzer: &CityAnalyzer,
        records: &[CityRecord],
    ) -> Result<TrainedModel, ModelError> {
        let mut targets = Vec::with_capacity(records.len());
        for record in records {
            targets.push(analyzer.analyze(record)?.sustainability_score);
        }
        self.train(records, &targets)
    }
}

/// Immutable fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    forest: RandomForest,
    training_samples: usize,
}

impl TrainedModel {
    pub fn predict(&self, record: &CityRecord) -> f64 {
        self.forest.predict(&feature_vector(record))
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    /// Display-named weights, highest first.
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let mut importance: Vec<FeatureImportance> = FEATURE_NAMES
            .iter()
            .zip(self.forest.feature_importance())
            .map(|(name, weight)| FeatureImportance {
                name: name.to_string(),
                weight,
            })
            .collect();
        importance.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        importance
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_string(self)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, payload)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Shared slot for the currently installed model. Readers clone the `Arc` and never
/// observe a half-replaced model.
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    pub fn install(&self, model: TrainedModel) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::new(model));
    }

    pub fn snapshot(&self) -> Option<Arc<TrainedModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn predict(&self, record: &CityRecord) -> Result<f64, ModelError> {
        let model = self.snapshot().ok_or(ModelError::Untrained)?;
        record.validate()?;
        Ok(model.predict(record))
    }

    pub fn feature_importance(&self) -> Result<Vec<FeatureImportance>, ModelError> {
        let model = self.snapshot().ok_or(ModelError::Untrained)?;
        Ok(model.feature_importance())
    }
}

/// Learned estimate next to the rule-based score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_prediction: Option<f64>,
    pub rule_based_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    pub model_trained: bool,
}

pub fn compare(
    handle: &ModelHandle,
    analyzer: &CityAnalyzer,
    record: &CityRecord,
) -> Result<ModelComparison, ModelError> {
    let rule_based_score = analyzer.analyze(record)?.sustainability_score;
    let ml_prediction = handle.snapshot().map(|model| model.predict(record));

    Ok(ModelComparison {
        ml_prediction,
        rule_based_score,
        difference: ml_prediction.map(|prediction| (prediction - rule_based_score).abs()),
        model_trained: ml_prediction.is_some(),
    })
}
