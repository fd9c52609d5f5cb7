use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FieldError, RecordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficDensity {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

impl TrafficDensity {
    pub fn label(self) -> &'static str {
        match self {
            TrafficDensity::Low => "Low",
            TrafficDensity::Medium => "Medium",
            TrafficDensity::High => "High",
        }
    }
}

impl FromStr for TrafficDensity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(TrafficDensity::Low),
            "medium" | "moderate" => Ok(TrafficDensity::Medium),
            "high" => Ok(TrafficDensity::High),
            other => Err(format!("expected Low, Medium or High, got {:?}", other)),
        }
    }
}

impl fmt::Display for TrafficDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw metrics of one city, as fed to every engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    /// km²
    pub area: f64,
    pub population: u64,
    /// people per km²
    pub population_density: f64,
    pub built_up_percentage: f64,
    /// km²
    pub green_space_area: f64,
    /// km²
    pub open_land_area: f64,
    pub green_coverage_percentage: f64,
    pub existing_parks: u32,
    pub tree_coverage: f64,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub co2_estimation: f64,
    pub traffic_density: TrafficDensity,
    pub vehicle_count: u64,
    pub public_transport_usage: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CityRecord {
    /// Builds a record with the required metrics; optional metrics start at zero and
    /// the density is derived from population and area.
    pub fn new(
        name: impl Into<String>,
        area: f64,
        population: u64,
        built_up_percentage: f64,
        green_space_area: f64,
        green_coverage_percentage: f64,
        traffic_density: TrafficDensity,
    ) -> Self {
        let population_density = if area > 0.0 {
            population as f64 / area
        } else {
            0.0
        };
        Self {
            name: name.into(),
            area,
            population,
            population_density,
            built_up_percentage,
            green_space_area,
            open_land_area: 0.0,
            green_coverage_percentage,
            existing_parks: 0,
            tree_coverage: 0.0,
            aqi: 0.0,
            pm25: 0.0,
            pm10: 0.0,
            co2_estimation: 0.0,
            traffic_density,
            vehicle_count: 0,
            public_transport_usage: 0.0,
            latitude: None,
            longitude: None,
        }
    }

    /// Checks every range invariant and reports all offending fields at once.
    pub fn validate(&self) -> Result<(), RecordError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if !self.area.is_finite() || self.area <= 0.0 {
            errors.push(FieldError::new("area", "must be greater than 0"));
        }
        if self.population == 0 {
            errors.push(FieldError::new("population", "must be greater than 0"));
        }

        check_non_negative(&mut errors, "population_density", self.population_density);
        check_percentage(&mut errors, "built_up_percentage", self.built_up_percentage);
        check_non_negative(&mut errors, "green_space_area", self.green_space_area);
        check_non_negative(&mut errors, "open_land_area", self.open_land_area);
        check_percentage(
            &mut errors,
            "green_coverage_percentage",
            self.green_coverage_percentage,
        );
        check_percentage(&mut errors, "tree_coverage", self.tree_coverage);
        check_non_negative(&mut errors, "aqi", self.aqi);
        check_non_negative(&mut errors, "pm25", self.pm25);
        check_non_negative(&mut errors, "pm10", self.pm10);
        check_non_negative(&mut errors, "co2_estimation", self.co2_estimation);
        check_percentage(
            &mut errors,
            "public_transport_usage",
            self.public_transport_usage,
        );

        if let Some(latitude) = self.latitude {
            if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
                errors.push(FieldError::new("latitude", "must be between -90 and 90"));
            }
        }
        if let Some(longitude) = self.longitude {
            if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
                errors.push(FieldError::new("longitude", "must be between -180 and 180"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RecordError::InvalidRecord(errors))
        }
    }
}

pub(crate) fn check_non_negative(errors: &mut Vec<FieldError>, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(field, "must be a number >= 0"));
    }
}

pub(crate) fn check_percentage(errors: &mut Vec<FieldError>, field: &str, value: f64) {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        errors.push(FieldError::new(field, "must be between 0 and 100"));
    }
}
