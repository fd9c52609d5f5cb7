use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::city::{CityRecord, TrafficDensity};
use crate::config::RecommendationConfig;
use crate::format_number;
use crate::scoring::SustainabilityMetrics;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub immediate_actions: Vec<String>,
    /// 1-2 years.
    pub short_term: Vec<String>,
    /// 3-5 years.
    pub long_term: Vec<String>,
    pub zone_specific: BTreeMap<String, Vec<String>>,
}

impl RecommendationSet {
    pub fn len(&self) -> usize {
        self.immediate_actions.len()
            + self.short_term.len()
            + self.long_term.len()
            + self.zone_specific.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    pub fn recommend(&self, city: &CityRecord, metrics: &SustainabilityMetrics) -> RecommendationSet {
        let mut recommendations = RecommendationSet::default();

        if metrics.sustainability_score < self.config.immediate_score_threshold {
            recommendations.immediate_actions.extend([
                "Implement emergency tree plantation drive".to_string(),
                "Create temporary green spaces in vacant lots".to_string(),
                "Introduce car-free days to reduce pollution".to_string(),
            ]);
        }

        if metrics.required_green_space > 0.0 {
            recommendations.short_term.extend([
                format!("Develop {} new parks", metrics.recommended_parks),
                format!(
                    "Plant {} trees",
                    format_number(metrics.recommended_trees as f64)
                ),
                "Convert rooftops to green spaces".to_string(),
                "Create urban gardens in residential areas".to_string(),
            ]);
        }

        if city.aqi > self.config.emission_control_aqi {
            recommendations
                .short_term
                .push("Implement strict vehicle emission controls".to_string());
        }

        recommendations.long_term.extend([
            "Develop urban forest corridors".to_string(),
            "Implement smart traffic management".to_string(),
            "Expand public transportation network".to_string(),
            "Create green building incentives".to_string(),
        ]);

        if city.traffic_density == TrafficDensity::High {
            recommendations.zone_specific.insert(
                "traffic_zones".to_string(),
                vec![
                    "Install air purifying plants along highways".to_string(),
                    "Create buffer green zones around industrial areas".to_string(),
                ],
            );
        }

        recommendations
    }
}
