use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::city::CityRecord;
use crate::config::{AnalyzerConfig, SimulationConfig};
use crate::error::SimulationError;
use crate::scoring::{CityAnalyzer, SustainabilityMetrics};

pub const GREEN_SPACE_INCREASE: &str = "green_space_increase";
pub const TREE_PLANTATION: &str = "tree_plantation";
pub const TRAFFIC_REDUCTION: &str = "traffic_reduction";

/// One what-if perturbation of a city record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", content = "value", rename_all = "snake_case")]
pub enum Scenario {
    /// Percent growth of green space area and coverage.
    GreenSpaceIncrease(f64),
    /// Number of trees planted.
    TreePlantation(f64),
    /// Percent cut in vehicle count.
    TrafficReduction(f64),
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::GreenSpaceIncrease(_) => GREEN_SPACE_INCREASE,
            Scenario::TreePlantation(_) => TREE_PLANTATION,
            Scenario::TrafficReduction(_) => TRAFFIC_REDUCTION,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Scenario::GreenSpaceIncrease(value)
            | Scenario::TreePlantation(value)
            | Scenario::TrafficReduction(value) => *value,
        }
    }

    pub fn from_named(name: &str, value: f64) -> Result<Self, SimulationError> {
        let scenario = match name.trim().to_lowercase().as_str() {
            GREEN_SPACE_INCREASE => Scenario::GreenSpaceIncrease(value),
            TREE_PLANTATION => Scenario::TreePlantation(value),
            TRAFFIC_REDUCTION => Scenario::TrafficReduction(value),
            _ => return Err(SimulationError::UnknownScenario(name.to_string())),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let value = self.value();
        let reason = if !value.is_finite() {
            Some("must be a finite number")
        } else {
            match self {
                Scenario::GreenSpaceIncrease(percent) if *percent < -100.0 => {
                    Some("cannot remove more than 100% of green space")
                }
                Scenario::TreePlantation(trees) if *trees < 0.0 => {
                    Some("tree count must be >= 0")
                }
                Scenario::TrafficReduction(percent) if !(0.0..=100.0).contains(percent) => {
                    Some("must be between 0 and 100")
                }
                _ => None,
            }
        };

        match reason {
            Some(reason) => Err(SimulationError::InvalidScenarioValue {
                scenario: self.name().to_string(),
                value,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Ordered list of validated scenarios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Builds a set from `name -> value` pairs. Map order is ignored: green space first,
    /// then trees, then traffic.
    pub fn from_named(named: &BTreeMap<String, f64>) -> Result<Self, SimulationError> {
        let mut scenarios = named
            .iter()
            .map(|(name, value)| Scenario::from_named(name, *value))
            .collect::<Result<Vec<_>, _>>()?;
        scenarios.sort_by_key(canonical_rank);
        Ok(Self { scenarios })
    }

    pub fn as_slice(&self) -> &[Scenario] {
        &self.scenarios
    }
}

fn canonical_rank(scenario: &Scenario) -> u8 {
    match scenario {
        Scenario::GreenSpaceIncrease(_) => 0,
        Scenario::TreePlantation(_) => 1,
        Scenario::TrafficReduction(_) => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDeltas {
    /// new - original.
    pub sustainability_score_change: f64,
    /// original - new, so a cleaner city reports a positive change.
    pub aqi_change: f64,
    /// new - original.
    pub green_space_per_capita_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenarios: Vec<Scenario>,
    pub modified_city: CityRecord,
    pub original_metrics: SustainabilityMetrics,
    pub new_metrics: SustainabilityMetrics,
    pub deltas: SimulationDeltas,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    analyzer: CityAnalyzer,
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            analyzer: CityAnalyzer::new(config),
            config: config.simulation.clone(),
        }
    }

    /// Scores `city` before and after applying `scenarios` in order. `city` is left untouched.
    pub fn simulate(
        &self,
        city: &CityRecord,
        scenarios: &[Scenario],
    ) -> Result<SimulationResult, SimulationError> {
        for scenario in scenarios {
            scenario.validate()?;
        }
        let original_metrics = self.analyzer.analyze(city)?;

        let mut modified_city = city.clone();
        for scenario in scenarios {
            self.apply(&mut modified_city, scenario);
        }
        let new_metrics = self.analyzer.analyze(&modified_city)?;

        let deltas = SimulationDeltas {
            sustainability_score_change: new_metrics.sustainability_score
                - original_metrics.sustainability_score,
            aqi_change: city.aqi - modified_city.aqi,
            green_space_per_capita_change: new_metrics.green_space_per_capita
                - original_metrics.green_space_per_capita,
        };

        debug!(
            city = %city.name,
            scenarios = scenarios.len(),
            score_change = deltas.sustainability_score_change,
            "simulated scenarios"
        );

        Ok(SimulationResult {
            scenarios: scenarios.to_vec(),
            modified_city,
            original_metrics,
            new_metrics,
            deltas,
        })
    }

    pub fn simulate_set(
        &self,
        city: &CityRecord,
        scenarios: &ScenarioSet,
    ) -> Result<SimulationResult, SimulationError> {
        self.simulate(city, scenarios.as_slice())
    }

    fn apply(&self, city: &mut CityRecord, scenario: &Scenario) {
        match *scenario {
            Scenario::GreenSpaceIncrease(percent) => {
                let factor = 1.0 + percent / 100.0;
                city.green_space_area *= factor;
                city.green_coverage_percentage =
                    (city.green_coverage_percentage * factor).min(100.0);
            }
            Scenario::TreePlantation(trees) => {
                city.green_space_area += trees * self.config.area_per_tree_km2;
            }
            Scenario::TrafficReduction(percent) => {
                let share = percent / 100.0;
                city.vehicle_count = (city.vehicle_count as f64 * (1.0 - share)).trunc() as u64;
                city.aqi -= city.aqi * share * self.config.traffic_aqi_factor;
            }
        }
    }
}
