use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Weights of the five score components. The debt total reuses the same weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComponentWeights {
    pub green_space: f64,
    pub air_quality: f64,
    pub traffic: f64,
    pub land_use: f64,
    pub transport: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            green_space: 0.30,
            air_quality: 0.25,
            traffic: 0.20,
            land_use: 0.15,
            transport: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StandardsConfig {
    /// m² of green space per inhabitant.
    pub who_green_standard: f64,
    pub safe_aqi_threshold: f64,
    /// people per km² at which the traffic density factor reaches 1.0.
    pub max_acceptable_density: f64,
    pub optimal_built_up: f64,
    pub optimal_transport_usage: f64,
}

impl Default for StandardsConfig {
    fn default() -> Self {
        Self {
            who_green_standard: 9.0,
            safe_aqi_threshold: 50.0,
            max_acceptable_density: 10_000.0,
            optimal_built_up: 60.0,
            optimal_transport_usage: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrafficMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for TrafficMultipliers {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.5,
            high: 2.0,
        }
    }
}

/// Lower bounds (inclusive) of each badge tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierThresholds {
    pub excellent: f64,
    pub good: f64,
    pub moderate: f64,
    pub poor: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            good: 65.0,
            moderate: 45.0,
            poor: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemediationConfig {
    pub park_size_km2: f64,
    pub trees_per_hectare: f64,
    pub maintenance_trees_min: u64,
    pub maintenance_trees_per_capita: f64,
    pub co2_kg_per_tree_per_year: f64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            park_size_km2: 0.05,
            trees_per_hectare: 100.0,
            maintenance_trees_min: 100,
            maintenance_trees_per_capita: 0.01,
            co2_kg_per_tree_per_year: 22.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    pub immediate_score_threshold: f64,
    pub emission_control_aqi: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            immediate_score_threshold: 40.0,
            emission_control_aqi: 100.0,
        }
    }
}

/// A value per severity level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeverityTable {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BudgetSplit {
    pub short_term: f64,
    pub mid_term: f64,
    pub long_term: f64,
}

impl Default for BudgetSplit {
    fn default() -> Self {
        Self {
            short_term: 0.2,
            mid_term: 0.5,
            long_term: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub critical_aqi: f64,
    pub high_aqi: f64,
    pub critical_pm25: f64,
    pub critical_green_deficit: f64,
    pub dense_built_up: f64,
    pub min_tree_coverage: f64,
    pub target_tree_coverage: f64,
    pub critical_priority_below: f64,
    pub high_priority_below: f64,
    pub medium_priority_below: f64,
    pub impact_weights: SeverityTable,
    pub impact_points: f64,
    pub impact_base_score: f64,
    pub budget_multipliers: SeverityTable,
    pub base_cost_per_capita: f64,
    pub budget_split: BudgetSplit,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            critical_aqi: 150.0,
            high_aqi: 100.0,
            critical_pm25: 60.0,
            critical_green_deficit: 6.0,
            dense_built_up: 70.0,
            min_tree_coverage: 15.0,
            target_tree_coverage: 20.0,
            critical_priority_below: 40.0,
            high_priority_below: 60.0,
            medium_priority_below: 75.0,
            impact_weights: SeverityTable {
                critical: 1.0,
                high: 0.8,
                medium: 0.6,
                low: 0.4,
            },
            impact_points: 20.0,
            impact_base_score: 50.0,
            budget_multipliers: SeverityTable {
                critical: 2.0,
                high: 1.5,
                medium: 1.0,
                low: 0.5,
            },
            base_cost_per_capita: 500.0,
            budget_split: BudgetSplit::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub area_per_tree_km2: f64,
    /// Share of a traffic reduction that carries over to the AQI.
    pub traffic_aqi_factor: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            area_per_tree_km2: 0.0001,
            traffic_aqi_factor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub min_training_samples: usize,
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_training_samples: 5,
            trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub weights: ComponentWeights,
    pub standards: StandardsConfig,
    pub traffic: TrafficMultipliers,
    pub tiers: TierThresholds,
    pub remediation: RemediationConfig,
    pub recommendations: RecommendationConfig,
    pub planner: PlannerConfig,
    pub simulation: SimulationConfig,
    pub model: ModelConfig,
}

impl AnalyzerConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml(&contents)?
            }
            _ => AnalyzerConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_parse::<f64>("WHO_GREEN_STANDARD") {
            self.standards.who_green_standard = value;
        }
        if let Some(value) = env_parse::<f64>("SAFE_AQI_THRESHOLD") {
            self.standards.safe_aqi_threshold = value;
        }
        if let Some(value) = env_parse::<f64>("MAX_ACCEPTABLE_DENSITY") {
            self.standards.max_acceptable_density = value;
        }
        if let Some(value) = env_parse::<usize>("MODEL_MIN_TRAINING_SAMPLES") {
            self.model.min_training_samples = value;
        }
        if let Some(value) = env_parse::<usize>("MODEL_TREES") {
            self.model.trees = value;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn default_config_path() -> Option<PathBuf> {
    env::var("SUSTAIN_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/sustainability.toml")))
}
