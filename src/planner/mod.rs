pub mod actions;
pub mod estimate;
pub mod weakness;

use serde::{Deserialize, Serialize};

use crate::city::CityRecord;
use crate::config::{AnalyzerConfig, PlannerConfig};
use crate::scoring::SustainabilityMetrics;

pub use actions::{CostLevel, ImpactLevel, PlannedAction, Quantity, Timeframe};
pub use estimate::{BudgetEstimate, ImpactEstimate, PriorityLevel};
pub use weakness::{Severity, WeaknessCategory, WeaknessDetector, WeaknessProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub city_name: String,
    pub overall_priority: PriorityLevel,
    pub weaknesses: WeaknessProfile,
    pub short_term: Vec<PlannedAction>,
    pub mid_term: Vec<PlannedAction>,
    pub long_term: Vec<PlannedAction>,
    pub estimated_impact: ImpactEstimate,
    pub budget_estimate: BudgetEstimate,
}

impl ActionPlan {
    pub fn actions(&self, timeframe: Timeframe) -> &[PlannedAction] {
        match timeframe {
            Timeframe::ShortTerm => &self.short_term,
            Timeframe::MidTerm => &self.mid_term,
            Timeframe::LongTerm => &self.long_term,
        }
    }
}

/// Builds a per-city remediation plan from the weaknesses the metrics reveal.
#[derive(Debug, Clone, Default)]
pub struct PersonalizedPlanner {
    config: PlannerConfig,
    detector: WeaknessDetector,
}

impl PersonalizedPlanner {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            config: config.planner.clone(),
            detector: WeaknessDetector::new(config.planner.clone(), config.standards.clone()),
        }
    }

    pub fn weaknesses(&self, city: &CityRecord, metrics: &SustainabilityMetrics) -> WeaknessProfile {
        self.detector.detect(city, metrics)
    }

    pub fn plan(&self, city: &CityRecord, metrics: &SustainabilityMetrics) -> ActionPlan {
        let weaknesses = self.weaknesses(city, metrics);

        ActionPlan {
            city_name: city.name.clone(),
            overall_priority: estimate::priority_for(metrics.sustainability_score, &self.config),
            short_term: actions::short_term_actions(city, &weaknesses),
            mid_term: actions::mid_term_actions(city, &weaknesses),
            long_term: actions::long_term_actions(city, metrics, &weaknesses),
            estimated_impact: estimate::estimate_impact(&weaknesses, &self.config),
            budget_estimate: estimate::estimate_budget(city.population, &weaknesses, &self.config),
            weaknesses,
        }
    }
}
