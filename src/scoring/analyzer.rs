use tracing::debug;

use crate::city::{CityRecord, TrafficDensity};
use crate::config::{AnalyzerConfig, ComponentWeights, StandardsConfig, TierThresholds, TrafficMultipliers};
use crate::error::RecordError;
use crate::round_to;
use crate::scoring::components::{
    air_quality_score, air_quality_status, green_space_score, green_space_status, land_use_score,
    land_use_status, traffic_score, traffic_status, transport_score, transport_status,
};
use crate::scoring::{
    BadgeLevel, Category, ComponentScore, ComponentValue, DebtCalculator, RemediationSizer,
    ScoreExplanation, SustainabilityMetrics,
};

/// Rule-based sustainability scorer. Pure: the same record always yields the same metrics.
#[derive(Debug, Clone)]
pub struct CityAnalyzer {
    weights: ComponentWeights,
    standards: StandardsConfig,
    traffic: TrafficMultipliers,
    tiers: TierThresholds,
    debt: DebtCalculator,
    remediation: RemediationSizer,
}

impl Default for CityAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl CityAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            standards: config.standards.clone(),
            traffic: config.traffic.clone(),
            tiers: config.tiers.clone(),
            debt: DebtCalculator::new(config.weights.clone(), config.standards.clone()),
            remediation: RemediationSizer::new(config.remediation.clone()),
        }
    }

    pub fn analyze(&self, city: &CityRecord) -> Result<SustainabilityMetrics, RecordError> {
        city.validate()?;

        let green_per_capita = self.green_space_per_capita(city);
        let explanation = self.score_components(city);
        let sustainability_score = self.aggregate(&explanation);
        let badge_level = self.categorize(sustainability_score);
        let debt = self
            .debt
            .calculate(city, green_per_capita, self.traffic_multiplier(city.traffic_density));
        let remediation = self.remediation.size(
            city.population,
            green_per_capita,
            self.standards.who_green_standard,
        );

        debug!(
            city = %city.name,
            score = sustainability_score,
            badge = badge_level.label(),
            total_debt = debt.total_debt,
            "analyzed city"
        );

        Ok(SustainabilityMetrics {
            green_space_per_capita: green_per_capita,
            who_standard_compliance: self.who_compliance(green_per_capita),
            sustainability_score,
            category: badge_level.category(),
            badge_level,
            required_green_space: remediation.required_green_space,
            recommended_parks: remediation.recommended_parks,
            recommended_trees: remediation.recommended_trees,
            co2_reduction_potential: remediation.co2_reduction_potential,
            sustainability_debt: debt,
            score_explanation: explanation,
        })
    }

    /// m² of green space per inhabitant.
    pub fn green_space_per_capita(&self, city: &CityRecord) -> f64 {
        if city.population == 0 {
            return 0.0;
        }
        city.green_space_area * 1_000_000.0 / city.population as f64
    }

    pub fn who_compliance(&self, green_per_capita: f64) -> f64 {
        (green_per_capita / self.standards.who_green_standard * 100.0).min(100.0)
    }

    pub fn traffic_multiplier(&self, density: TrafficDensity) -> f64 {
        match density {
            TrafficDensity::Low => self.traffic.low,
            TrafficDensity::Medium => self.traffic.medium,
            TrafficDensity::High => self.traffic.high,
        }
    }

    /// Per-component scores (one decimal) with their weights, inputs and status labels.
    pub fn score_components(&self, city: &CityRecord) -> ScoreExplanation {
        let green_per_capita = self.green_space_per_capita(city);
        let green_ratio = green_per_capita / self.standards.who_green_standard;
        let green_space = ComponentScore {
            score: round_to(green_space_score(green_ratio), 1),
            weight: percent(self.weights.green_space),
            value: ComponentValue::Number(green_per_capita),
            standard: Some(self.standards.who_green_standard),
            density_factor: None,
            status: green_space_status(green_ratio).to_string(),
        };

        let air_quality = ComponentScore {
            score: round_to(air_quality_score(city.aqi), 1),
            weight: percent(self.weights.air_quality),
            value: ComponentValue::Number(city.aqi),
            standard: Some(self.standards.safe_aqi_threshold),
            density_factor: None,
            status: air_quality_status(city.aqi).to_string(),
        };

        let multiplier = self.traffic_multiplier(city.traffic_density);
        let density_factor = (city.population_density / self.standards.max_acceptable_density).min(2.0);
        let raw_traffic = traffic_score(multiplier, density_factor);
        let traffic = ComponentScore {
            score: round_to(raw_traffic, 1),
            weight: percent(self.weights.traffic),
            value: ComponentValue::Label(city.traffic_density.label().to_string()),
            standard: None,
            density_factor: Some(round_to(density_factor, 2)),
            status: traffic_status(raw_traffic).to_string(),
        };

        let land_use = ComponentScore {
            score: round_to(land_use_score(city.built_up_percentage), 1),
            weight: percent(self.weights.land_use),
            value: ComponentValue::Number(city.built_up_percentage),
            standard: None,
            density_factor: None,
            status: land_use_status(city.built_up_percentage).to_string(),
        };

        let transport = ComponentScore {
            score: round_to(transport_score(city.public_transport_usage), 1),
            weight: percent(self.weights.transport),
            value: ComponentValue::Number(city.public_transport_usage),
            standard: None,
            density_factor: None,
            status: transport_status(city.public_transport_usage).to_string(),
        };

        ScoreExplanation {
            green_space,
            air_quality,
            traffic,
            land_use,
            transport,
        }
    }

    pub fn aggregate(&self, explanation: &ScoreExplanation) -> f64 {
        let total = explanation.green_space.score * self.weights.green_space
            + explanation.air_quality.score * self.weights.air_quality
            + explanation.traffic.score * self.weights.traffic
            + explanation.land_use.score * self.weights.land_use
            + explanation.transport.score * self.weights.transport;
        round_to(total, 2)
    }

    /// Each tier includes its lower bound.
    pub fn categorize(&self, score: f64) -> BadgeLevel {
        if score >= self.tiers.excellent {
            BadgeLevel::Excellent
        } else if score >= self.tiers.good {
            BadgeLevel::Good
        } else if score >= self.tiers.moderate {
            BadgeLevel::Moderate
        } else if score >= self.tiers.poor {
            BadgeLevel::Poor
        } else {
            BadgeLevel::Critical
        }
    }

    pub fn category(&self, score: f64) -> Category {
        self.categorize(score).category()
    }
}

fn percent(weight: f64) -> f64 {
    round_to(weight * 100.0, 1)
}
