use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::city::CityRecord;
use crate::recommendations::RecommendationSet;
use crate::round_to;
use crate::scoring::SustainabilityMetrics;

/// Full analysis of one city as a nested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub city: CityRecord,
    pub metrics: SustainabilityMetrics,
    pub recommendations: RecommendationSet,
}

pub fn build_report(
    city: &CityRecord,
    metrics: &SustainabilityMetrics,
    recommendations: &RecommendationSet,
) -> CityReport {
    CityReport {
        city: city.clone(),
        metrics: metrics.clone(),
        recommendations: recommendations.clone(),
    }
}

/// Flat spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Sustainability Score")]
    pub sustainability_score: f64,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Green Space per Capita")]
    pub green_space_per_capita: f64,
    #[serde(rename = "WHO Compliance")]
    pub who_compliance: f64,
    #[serde(rename = "Required Green Space")]
    pub required_green_space: f64,
    #[serde(rename = "Recommended Parks")]
    pub recommended_parks: u64,
    #[serde(rename = "Recommended Trees")]
    pub recommended_trees: u64,
    #[serde(rename = "CO2 Reduction Potential")]
    pub co2_reduction_potential: f64,
}

impl From<&CityReport> for ExportRow {
    fn from(report: &CityReport) -> Self {
        let metrics = &report.metrics;
        Self {
            city: report.city.name.clone(),
            sustainability_score: metrics.sustainability_score,
            category: metrics.category.label().to_string(),
            green_space_per_capita: round_to(metrics.green_space_per_capita, 2),
            who_compliance: round_to(metrics.who_standard_compliance, 1),
            required_green_space: round_to(metrics.required_green_space, 2),
            recommended_parks: metrics.recommended_parks,
            recommended_trees: metrics.recommended_trees,
            co2_reduction_potential: round_to(metrics.co2_reduction_potential, 2),
        }
    }
}

pub fn write_csv<W: Write>(writer: W, reports: &[CityReport]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for report in reports {
        writer.serialize(ExportRow::from(report))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, reports: &[CityReport]) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, reports)
}
