use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use urban_sustain::store::StoredCity;
use urban_sustain::{
    BadgeLevel, CityInput, CityRecord, FeatureImportance, FieldError, ModelError, RecordError,
    ScenarioSet, SimulationError, StoreError,
};

use crate::enrich::CitySuggestion;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, Vec::new()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            ApiError::InvalidRecord(err) => invalid_record(err),
            ApiError::Simulation(SimulationError::InvalidRecord(err)) => invalid_record(err),
            ApiError::Simulation(err) => (StatusCode::BAD_REQUEST, err.to_string(), Vec::new()),
            ApiError::Model(ModelError::InvalidRecord(err)) => invalid_record(err),
            ApiError::Model(ModelError::Untrained) => (
                StatusCode::CONFLICT,
                "model is not trained".to_string(),
                Vec::new(),
            ),
            ApiError::Model(
                err @ (ModelError::InsufficientTrainingData { .. }
                | ModelError::TargetCountMismatch { .. }
                | ModelError::InvalidTarget { .. }),
            ) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), Vec::new()),
            ApiError::Model(err) => {
                tracing::error!("model error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal model error".to_string(),
                    Vec::new(),
                )
            }
            ApiError::Store(StoreError::NotFound(name)) => (
                StatusCode::NOT_FOUND,
                format!("city not found: {}", name),
                Vec::new(),
            ),
            ApiError::Store(err) => {
                tracing::error!("store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                    Vec::new(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, Vec::new())
            }
        };

        (
            status,
            axum::Json(ErrorResponse {
                error: message,
                fields,
            }),
        )
            .into_response()
    }
}

fn invalid_record(err: RecordError) -> (StatusCode, String, Vec<FieldError>) {
    let message = err.to_string();
    (StatusCode::UNPROCESSABLE_ENTITY, message, err.fields().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct CityRequest {
    #[serde(flatten)]
    pub city: CityInput,
    /// Look up coordinates and air quality before storing.
    #[serde(default)]
    pub enrich: bool,
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    /// Required on `/api/simulate`, rejected on the per-city route.
    pub city: Option<CityInput>,
    #[serde(default)]
    pub scenarios: BTreeMap<String, f64>,
}

impl SimulateRequest {
    /// Scenarios for a stored city. An inline city would be ignored, so it is refused.
    pub fn for_stored_city(self) -> Result<ScenarioSet, ApiError> {
        if self.city.is_some() {
            return Err(ApiError::BadRequest(
                "city must not be supplied when simulating a stored city".to_string(),
            ));
        }
        Ok(ScenarioSet::from_named(&self.scenarios)?)
    }

    pub fn for_inline_city(self) -> Result<(CityRecord, ScenarioSet), ApiError> {
        let city = self
            .city
            .ok_or_else(|| ApiError::BadRequest("city is required".to_string()))?;
        let record = city.validate()?;
        Ok((record, ScenarioSet::from_named(&self.scenarios)?))
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub city: CityInput,
}

#[derive(Debug, Serialize)]
pub struct CitySummary {
    pub name: String,
    pub sustainability_score: Option<f64>,
    pub badge_level: Option<BadgeLevel>,
    pub analyses: usize,
    pub simulations: usize,
}

impl From<&StoredCity> for CitySummary {
    fn from(city: &StoredCity) -> Self {
        let latest = city.latest_analysis();
        Self {
            name: city.record.name.clone(),
            sustainability_score: latest.map(|entry| entry.metrics.sustainability_score),
            badge_level: latest.map(|entry| entry.metrics.badge_level),
            analyses: city.analyses.len(),
            simulations: city.simulations.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub samples: usize,
    pub feature_importance: Vec<FeatureImportance>,
    pub saved_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SampleDataResponse {
    pub loaded: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<CitySuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> SimulateRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn stored_city_simulation_refuses_inline_city() {
        let err = request(r#"{"city": {"name": "Pune"}, "scenarios": {"tree_plantation": 100}}"#)
            .for_stored_city()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let scenarios = request(r#"{"scenarios": {"traffic_reduction": 20, "tree_plantation": 100}}"#)
            .for_stored_city()
            .unwrap();
        assert_eq!(scenarios.as_slice().len(), 2);
    }

    #[test]
    fn inline_simulation_requires_city() {
        let err = request(r#"{"scenarios": {"tree_plantation": 100}}"#)
            .for_inline_city()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = request(r#"{"scenarios": {"planting": 1}, "city": {"name": "Pune", "area": 331.26,
            "population": 3124458, "built_up_percentage": 55, "green_space_area": 15.2,
            "green_coverage_percentage": 18.5, "traffic_density": "Medium"}}"#)
            .for_inline_city()
            .unwrap_err();
        assert!(matches!(err, ApiError::Simulation(SimulationError::UnknownScenario(_))));
    }
}
