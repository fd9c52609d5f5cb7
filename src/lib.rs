pub mod city;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod planner;
pub mod recommendations;
pub mod scoring;
pub mod simulation;
pub mod store;

pub use city::{CityInput, CityRecord, TrafficDensity};
pub use config::AnalyzerConfig;
pub use error::{
    ConfigError, FieldError, ImportError, ModelError, RecordError, SimulationError, StoreError,
};
pub use export::{build_report, CityReport, ExportRow};
pub use model::{FeatureImportance, FeatureModel, ModelComparison, ModelHandle, TrainedModel};
pub use planner::{ActionPlan, PersonalizedPlanner};
pub use recommendations::{RecommendationEngine, RecommendationSet};
pub use scoring::{BadgeLevel, Category, CityAnalyzer, SustainabilityMetrics};
pub use simulation::{Scenario, ScenarioSet, SimulationEngine, SimulationResult};

/// Every engine built from one configuration.
#[derive(Debug, Clone, Default)]
pub struct Engines {
    pub analyzer: CityAnalyzer,
    pub recommendations: RecommendationEngine,
    pub planner: PersonalizedPlanner,
    pub simulation: SimulationEngine,
    pub model: FeatureModel,
}

impl Engines {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            analyzer: CityAnalyzer::new(config),
            recommendations: RecommendationEngine::new(config.recommendations.clone()),
            planner: PersonalizedPlanner::new(config),
            simulation: SimulationEngine::new(config),
            model: FeatureModel::new(config.model.clone()),
        }
    }

    /// Scores a city and attaches its recommendations.
    pub fn report(&self, city: &CityRecord) -> Result<CityReport, RecordError> {
        let metrics = self.analyzer.analyze(city)?;
        let recommendations = self.recommendations.recommend(city, &metrics);
        Ok(CityReport {
            city: city.clone(),
            metrics,
            recommendations,
        })
    }
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
