use serde::{Deserialize, Serialize};

use crate::city::record::{check_non_negative, check_percentage, CityRecord, TrafficDensity};
use crate::error::{FieldError, RecordError};

/// Loosely typed city payload, as it arrives from a form, a JSON body or a CSV row.
///
/// Counts (`population`, `existing_parks`, `vehicle_count`) are accepted as numbers and
/// truncated to integers, the way spreadsheet imports deliver them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityInput {
    pub name: Option<String>,
    pub area: Option<f64>,
    pub population: Option<f64>,
    pub population_density: Option<f64>,
    pub built_up_percentage: Option<f64>,
    pub green_space_area: Option<f64>,
    pub open_land_area: Option<f64>,
    pub green_coverage_percentage: Option<f64>,
    pub existing_parks: Option<f64>,
    pub tree_coverage: Option<f64>,
    pub aqi: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub co2_estimation: Option<f64>,
    pub traffic_density: Option<String>,
    pub vehicle_count: Option<f64>,
    pub public_transport_usage: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CityInput {
    pub fn validate(self) -> Result<CityRecord, RecordError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                errors.push(FieldError::new("name", "is required"));
                String::new()
            }
        };

        let area = required(&mut errors, "area", self.area);
        if let Some(area) = area {
            if !area.is_finite() || area <= 0.0 {
                errors.push(FieldError::new("area", "must be greater than 0"));
            }
        }

        let population = required(&mut errors, "population", self.population);
        if let Some(population) = population {
            if !population.is_finite() || population < 1.0 {
                errors.push(FieldError::new("population", "must be greater than 0"));
            }
        }

        let built_up = required(&mut errors, "built_up_percentage", self.built_up_percentage);
        if let Some(value) = built_up {
            check_percentage(&mut errors, "built_up_percentage", value);
        }
        let green_space = required(&mut errors, "green_space_area", self.green_space_area);
        if let Some(value) = green_space {
            check_non_negative(&mut errors, "green_space_area", value);
        }
        let green_coverage = required(
            &mut errors,
            "green_coverage_percentage",
            self.green_coverage_percentage,
        );
        if let Some(value) = green_coverage {
            check_percentage(&mut errors, "green_coverage_percentage", value);
        }

        let traffic_density = match self.traffic_density.as_deref() {
            Some(value) if !value.trim().is_empty() => match value.parse::<TrafficDensity>() {
                Ok(density) => Some(density),
                Err(reason) => {
                    errors.push(FieldError::new("traffic_density", reason));
                    None
                }
            },
            _ => {
                errors.push(FieldError::new("traffic_density", "is required"));
                None
            }
        };

        let population_density = match self.population_density {
            Some(value) if value > 0.0 => {
                check_non_negative(&mut errors, "population_density", value);
                Some(value)
            }
            Some(value) if value < 0.0 || !value.is_finite() => {
                errors.push(FieldError::new("population_density", "must be a number >= 0"));
                None
            }
            _ => None,
        };

        let open_land_area = optional_non_negative(&mut errors, "open_land_area", self.open_land_area);
        let existing_parks = optional_non_negative(&mut errors, "existing_parks", self.existing_parks);
        let tree_coverage = optional_percentage(&mut errors, "tree_coverage", self.tree_coverage);
        let aqi = optional_non_negative(&mut errors, "aqi", self.aqi);
        let pm25 = optional_non_negative(&mut errors, "pm25", self.pm25);
        let pm10 = optional_non_negative(&mut errors, "pm10", self.pm10);
        let co2_estimation = optional_non_negative(&mut errors, "co2_estimation", self.co2_estimation);
        let vehicle_count = optional_non_negative(&mut errors, "vehicle_count", self.vehicle_count);
        let public_transport_usage = optional_percentage(
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

        if !errors.is_empty() {
            return Err(RecordError::InvalidRecord(errors));
        }

        let (Some(area), Some(population), Some(traffic_density)) =
            (area, population, traffic_density)
        else {
            return Err(RecordError::InvalidRecord(vec![FieldError::new(
                "record",
                "incomplete after validation",
            )]));
        };

        let population = population as u64;
        let mut record = CityRecord::new(
            name,
            area,
            population,
            built_up.unwrap_or_default(),
            green_space.unwrap_or_default(),
            green_coverage.unwrap_or_default(),
            traffic_density,
        );
        if let Some(density) = population_density {
            record.population_density = density;
        }
        record.open_land_area = open_land_area;
        record.existing_parks = existing_parks as u32;
        record.tree_coverage = tree_coverage;
        record.aqi = aqi;
        record.pm25 = pm25;
        record.pm10 = pm10;
        record.co2_estimation = co2_estimation;
        record.vehicle_count = vehicle_count as u64;
        record.public_transport_usage = public_transport_usage;
        record.latitude = self.latitude;
        record.longitude = self.longitude;

        record.validate()?;
        Ok(record)
    }
}

impl From<&CityRecord> for CityInput {
    fn from(city: &CityRecord) -> Self {
        Self {
            name: Some(city.name.clone()),
            area: Some(city.area),
            population: Some(city.population as f64),
            population_density: Some(city.population_density),
            built_up_percentage: Some(city.built_up_percentage),
            green_space_area: Some(city.green_space_area),
            open_land_area: Some(city.open_land_area),
            green_coverage_percentage: Some(city.green_coverage_percentage),
            existing_parks: Some(city.existing_parks as f64),
            tree_coverage: Some(city.tree_coverage),
            aqi: Some(city.aqi),
            pm25: Some(city.pm25),
            pm10: Some(city.pm10),
            co2_estimation: Some(city.co2_estimation),
            traffic_density: Some(city.traffic_density.label().to_string()),
            vehicle_count: Some(city.vehicle_count as f64),
            public_transport_usage: Some(city.public_transport_usage),
            latitude: city.latitude,
            longitude: city.longitude,
        }
    }
}

fn required(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>) -> Option<f64> {
    if value.is_none() {
        errors.push(FieldError::new(field, "is required"));
    }
    value
}

fn optional_non_negative(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>) -> f64 {
    let value = value.unwrap_or(0.0);
    check_non_negative(errors, field, value);
    value
}

fn optional_percentage(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>) -> f64 {
    let value = value.unwrap_or(0.0);
    check_percentage(errors, field, value);
    value
}
