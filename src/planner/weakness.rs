use serde::{Deserialize, Serialize};

use crate::city::{CityRecord, TrafficDensity};
use crate::config::{PlannerConfig, StandardsConfig};
use crate::scoring::SustainabilityMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessCategory {
    AirQuality,
    GreenSpace,
    Traffic,
    UrbanDensity,
    TreeCoverage,
}

impl WeaknessCategory {
    pub fn label(self) -> &'static str {
        match self {
            WeaknessCategory::AirQuality => "air_quality",
            WeaknessCategory::GreenSpace => "green_space",
            WeaknessCategory::Traffic => "traffic",
            WeaknessCategory::UrbanDensity => "urban_density",
            WeaknessCategory::TreeCoverage => "tree_coverage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityWeakness {
    pub severity: Severity,
    pub current_aqi: f64,
    pub target_aqi: f64,
    pub gap: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_cause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenSpaceWeakness {
    pub severity: Severity,
    /// m² per person.
    pub current: f64,
    pub target: f64,
    pub deficit_per_capita: f64,
    pub total_deficit_sqkm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficWeakness {
    pub severity: Severity,
    pub current_density: TrafficDensity,
    pub vehicle_count: u64,
    pub public_transport_usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrbanDensityWeakness {
    pub severity: Severity,
    pub built_up: f64,
    pub available_space: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeCoverageWeakness {
    pub severity: Severity,
    pub current: f64,
    pub target: f64,
    pub gap: f64,
}

/// Weaknesses found for one city, keyed by category. Absent categories are healthy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaknessProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<AirQualityWeakness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_space: Option<GreenSpaceWeakness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficWeakness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urban_density: Option<UrbanDensityWeakness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_coverage: Option<TreeCoverageWeakness>,
}

impl WeaknessProfile {
    pub fn severities(&self) -> Vec<(WeaknessCategory, Severity)> {
        let mut found = Vec::new();
        if let Some(weakness) = &self.air_quality {
            found.push((WeaknessCategory::AirQuality, weakness.severity));
        }
        if let Some(weakness) = &self.green_space {
            found.push((WeaknessCategory::GreenSpace, weakness.severity));
        }
        if let Some(weakness) = &self.traffic {
            found.push((WeaknessCategory::Traffic, weakness.severity));
        }
        if let Some(weakness) = &self.urban_density {
            found.push((WeaknessCategory::UrbanDensity, weakness.severity));
        }
        if let Some(weakness) = &self.tree_coverage {
            found.push((WeaknessCategory::TreeCoverage, weakness.severity));
        }
        found
    }

    pub fn severity_of(&self, category: WeaknessCategory) -> Option<Severity> {
        self.severities()
            .into_iter()
            .find(|(found, _)| *found == category)
            .map(|(_, severity)| severity)
    }

    pub fn len(&self) -> usize {
        self.severities().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeaknessDetector {
    config: PlannerConfig,
    standards: StandardsConfig,
}

impl WeaknessDetector {
    pub fn new(config: PlannerConfig, standards: StandardsConfig) -> Self {
        Self { config, standards }
    }

    pub fn detect(&self, city: &CityRecord, metrics: &SustainabilityMetrics) -> WeaknessProfile {
        WeaknessProfile {
            air_quality: self.air_quality(city),
            green_space: self.green_space(city, metrics),
            traffic: self.traffic(city),
            urban_density: self.urban_density(city),
            tree_coverage: self.tree_coverage(city),
        }
    }

    fn air_quality(&self, city: &CityRecord) -> Option<AirQualityWeakness> {
        let target_aqi = self.standards.safe_aqi_threshold;
        if city.aqi > self.config.critical_aqi {
            let main_cause = if city.pm25 > self.config.critical_pm25 {
                "High PM2.5 and PM10 levels"
            } else {
                "Traffic emissions"
            };
            Some(AirQualityWeakness {
                severity: Severity::Critical,
                current_aqi: city.aqi,
                target_aqi,
                gap: city.aqi - target_aqi,
                main_cause: Some(main_cause.to_string()),
            })
        } else if city.aqi > self.config.high_aqi {
            Some(AirQualityWeakness {
                severity: Severity::High,
                current_aqi: city.aqi,
                target_aqi,
                gap: city.aqi - target_aqi,
                main_cause: None,
            })
        } else {
            None
        }
    }

    fn green_space(
        &self,
        city: &CityRecord,
        metrics: &SustainabilityMetrics,
    ) -> Option<GreenSpaceWeakness> {
        let target = self.standards.who_green_standard;
        if metrics.green_space_per_capita >= target {
            return None;
        }
        let deficit = target - metrics.green_space_per_capita;
        let severity = if deficit > self.config.critical_green_deficit {
            Severity::Critical
        } else {
            Severity::High
        };
        Some(GreenSpaceWeakness {
            severity,
            current: metrics.green_space_per_capita,
            target,
            deficit_per_capita: deficit,
            total_deficit_sqkm: deficit * city.population as f64 / 1_000_000.0,
        })
    }

    fn traffic(&self, city: &CityRecord) -> Option<TrafficWeakness> {
        if city.traffic_density != TrafficDensity::High {
            return None;
        }
        Some(TrafficWeakness {
            severity: Severity::High,
            current_density: city.traffic_density,
            vehicle_count: city.vehicle_count,
            public_transport_usage: city.public_transport_usage,
        })
    }

    fn urban_density(&self, city: &CityRecord) -> Option<UrbanDensityWeakness> {
        if city.built_up_percentage <= self.config.dense_built_up {
            return None;
        }
        Some(UrbanDensityWeakness {
            severity: Severity::Medium,
            built_up: city.built_up_percentage,
            available_space: 100.0 - city.built_up_percentage,
        })
    }

    fn tree_coverage(&self, city: &CityRecord) -> Option<TreeCoverageWeakness> {
        if city.tree_coverage >= self.config.min_tree_coverage {
            return None;
        }
        let target = self.config.target_tree_coverage;
        Some(TreeCoverageWeakness {
            severity: Severity::Medium,
            current: city.tree_coverage,
            target,
            gap: target - city.tree_coverage,
        })
    }
}
