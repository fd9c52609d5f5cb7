use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{PlannerConfig, SeverityTable};
use crate::planner::weakness::{Severity, WeaknessCategory, WeaknessProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn label(self) -> &'static str {
        match self {
            PriorityLevel::Critical => "CRITICAL - Immediate action required",
            PriorityLevel::High => "HIGH - Urgent improvements needed",
            PriorityLevel::Medium => "MEDIUM - Steady progress required",
            PriorityLevel::Low => "LOW - Maintain and optimize",
        }
    }
}

pub fn priority_for(score: f64, config: &PlannerConfig) -> PriorityLevel {
    if score < config.critical_priority_below {
        PriorityLevel::Critical
    } else if score < config.high_priority_below {
        PriorityLevel::High
    } else if score < config.medium_priority_below {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    /// Score points recoverable per weakness.
    pub by_category: BTreeMap<WeaknessCategory, f64>,
    pub total_potential: f64,
    pub target_score: f64,
}

pub fn estimate_impact(weaknesses: &WeaknessProfile, config: &PlannerConfig) -> ImpactEstimate {
    let mut by_category = BTreeMap::new();
    let mut total_potential = 0.0;

    for (category, severity) in weaknesses.severities() {
        let impact = severity_value(&config.impact_weights, severity) * config.impact_points;
        by_category.insert(category, impact);
        total_potential += impact;
    }

    ImpactEstimate {
        by_category,
        total_potential,
        target_score: (config.impact_base_score + total_potential).min(100.0),
    }
}

/// Five-year budget in local currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEstimate {
    pub per_capita: f64,
    pub severity_multiplier: f64,
    pub short_term: f64,
    pub mid_term: f64,
    pub long_term: f64,
    pub total: f64,
}

pub fn estimate_budget(
    population: u64,
    weaknesses: &WeaknessProfile,
    config: &PlannerConfig,
) -> BudgetEstimate {
    let severity_multiplier: f64 = weaknesses
        .severities()
        .into_iter()
        .map(|(_, severity)| severity_value(&config.budget_multipliers, severity))
        .sum();

    let per_capita = config.base_cost_per_capita * severity_multiplier;
    let total = population as f64 * per_capita;
    let split = &config.budget_split;

    BudgetEstimate {
        per_capita,
        severity_multiplier,
        short_term: total * split.short_term,
        mid_term: total * split.mid_term,
        long_term: total * split.long_term,
        total,
    }
}

fn severity_value(table: &SeverityTable, severity: Severity) -> f64 {
    match severity {
        Severity::Critical => table.critical,
        Severity::High => table.high,
        Severity::Medium => table.medium,
        Severity::Low => table.low,
    }
}
