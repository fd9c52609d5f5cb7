use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use urban_sustain::city::sample_cities;
use urban_sustain::export::{write_csv, CityReport};
use urban_sustain::model::{compare, ModelComparison, ModelHandle, TrainedModel};
use urban_sustain::store::{CityStore, StoredCity};
use urban_sustain::{
    ActionPlan, AnalyzerConfig, CityRecord, Engines, FeatureImportance, SimulationResult,
};

use crate::api::{
    ApiError, CityRequest, CitySummary, ClearResponse, ExportQuery, PredictRequest,
    SampleDataResponse, SimulateRequest, SuggestionsResponse, TrainResponse,
};
use crate::enrich::Enricher;

#[derive(Clone)]
struct AppState {
    engines: Arc<Engines>,
    store: Arc<CityStore>,
    model: Arc<ModelHandle>,
    model_path: Option<PathBuf>,
    enricher: Option<Enricher>,
}

pub async fn serve(args: crate::ServeArgs, config: AnalyzerConfig) -> Result<(), String> {
    let store = CityStore::load(args.store.clone())
        .await
        .map_err(|err| format!("failed to open city store: {}", err))?;

    let model = match args.model.as_ref().filter(|path| path.exists()) {
        Some(path) => {
            let trained = TrainedModel::load(path)
                .map_err(|err| format!("failed to load model {}: {}", path.display(), err))?;
            info!(path = %path.display(), "loaded trained model");
            ModelHandle::with_model(trained)
        }
        None => ModelHandle::new(),
    };

    let enricher = Enricher::from_env()?;
    let state = AppState {
        engines: Arc::new(Engines::new(&config)),
        store: Arc::new(store),
        model: Arc::new(model),
        model_path: args.model,
        enricher: enricher.is_configured().then_some(enricher),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/cities",
            get(list_cities).post(upsert_city).delete(clear_cities),
        )
        .route("/api/cities/:name", get(get_city).delete(delete_city))
        .route("/api/cities/:name/analyze", post(analyze_city))
        .route("/api/cities/:name/plan", get(plan_city))
        .route("/api/cities/:name/simulate", post(simulate_city))
        .route("/api/simulate", post(simulate_adhoc))
        .route("/api/model/train", post(train_model))
        .route("/api/model/predict", post(predict))
        .route("/api/model/importance", get(feature_importance))
        .route("/api/export/json", get(export_json))
        .route("/api/export/csv", get(export_csv))
        .route("/api/sample-data", post(load_sample_data))
        .route("/api/city-suggestions/:query", get(city_suggestions))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;
    info!(%addr, "listening");

    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn list_cities(State(state): State<AppState>) -> Json<Vec<CitySummary>> {
    let cities = state.store.list().await;
    Json(cities.iter().map(CitySummary::from).collect())
}

async fn get_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StoredCity>, ApiError> {
    state
        .store
        .get(&name)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(format!("city not found: {}", name)))
}

async fn upsert_city(
    State(state): State<AppState>,
    Json(request): Json<CityRequest>,
) -> Result<Json<CityReport>, ApiError> {
    let mut record = request.city.validate()?;
    if request.enrich {
        let enricher = state
            .enricher
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("enrichment not configured: set GEOAPIFY_API_KEY".to_string()))?;
        record = enricher.enrich(&record).await;
    }

    let report = state.engines.report(&record)?;
    state.store.upsert(record).await?;
    state
        .store
        .record_analysis(&report.city.name, report.metrics.clone())
        .await?;
    Ok(Json(report))
}

async fn delete_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("city not found: {}", name)))
    }
}

async fn clear_cities(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let removed = state.store.clear().await?;
    info!(removed, "cleared city store");
    Ok(Json(ClearResponse { removed }))
}

async fn analyze_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CityReport>, ApiError> {
    let record = stored_record(&state, &name).await?;
    let report = state.engines.report(&record)?;
    state
        .store
        .record_analysis(&name, report.metrics.clone())
        .await?;
    Ok(Json(report))
}

async fn plan_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ActionPlan>, ApiError> {
    let record = stored_record(&state, &name).await?;
    let metrics = state.engines.analyzer.analyze(&record)?;
    Ok(Json(state.engines.planner.plan(&record, &metrics)))
}

async fn simulate_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulationResult>, ApiError> {
    let scenarios = request.for_stored_city()?;
    let record = stored_record(&state, &name).await?;
    let result = state.engines.simulation.simulate_set(&record, &scenarios)?;
    state.store.record_simulation(&name, &result).await?;
    Ok(Json(result))
}

async fn simulate_adhoc(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulationResult>, ApiError> {
    let (record, scenarios) = request.for_inline_city()?;
    Ok(Json(state.engines.simulation.simulate_set(&record, &scenarios)?))
}

async fn train_model(State(state): State<AppState>) -> Result<Json<TrainResponse>, ApiError> {
    let records = state.store.records().await;
    let engines = state.engines.clone();
    let trained = tokio::task::spawn_blocking(move || {
        engines
            .model
            .train_from_analyzer(&engines.analyzer, &records)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("training task failed: {}", err)))??;

    let saved_to = match state.model_path.as_ref() {
        Some(path) => {
            trained.save(path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let response = TrainResponse {
        samples: trained.training_samples(),
        feature_importance: trained.feature_importance(),
        saved_to,
    };
    state.model.install(trained);
    Ok(Json(response))
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<ModelComparison>, ApiError> {
    let record = request.city.validate()?;
    Ok(Json(compare(&state.model, &state.engines.analyzer, &record)?))
}

async fn feature_importance(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeatureImportance>>, ApiError> {
    Ok(Json(state.model.feature_importance()?))
}

async fn export_json(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<Vec<CityReport>>, ApiError> {
    Ok(Json(reports(&state, query.city.as_deref()).await?))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = reports(&state, query.city.as_deref()).await?;
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &reports)
        .map_err(|err| ApiError::Internal(format!("failed to write csv: {}", err)))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sustainability_report.csv\"",
            ),
        ],
        buffer,
    ))
}

async fn load_sample_data(
    State(state): State<AppState>,
) -> Result<Json<SampleDataResponse>, ApiError> {
    let mut loaded = Vec::new();
    for record in sample_cities() {
        let metrics = state.engines.analyzer.analyze(&record)?;
        let name = record.name.clone();
        state.store.upsert(record).await?;
        state.store.record_analysis(&name, metrics).await?;
        loaded.push(name);
    }
    info!(count = loaded.len(), "loaded sample cities");
    Ok(Json(SampleDataResponse { loaded }))
}

/// Lookup failures degrade to an empty list.
async fn city_suggestions(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Json<SuggestionsResponse> {
    let suggestions = match state.enricher.as_ref() {
        Some(enricher) => enricher.suggest(&query).await.unwrap_or_else(|err| {
            warn!(query = %query, error = %err, "city suggestions failed");
            Vec::new()
        }),
        None => Vec::new(),
    };
    Json(SuggestionsResponse { suggestions })
}

async fn stored_record(state: &AppState, name: &str) -> Result<CityRecord, ApiError> {
    state
        .store
        .get(name)
        .await
        .map(|city| city.record)
        .ok_or_else(|| ApiError::NotFound(format!("city not found: {}", name)))
}

async fn reports(state: &AppState, city: Option<&str>) -> Result<Vec<CityReport>, ApiError> {
    let records = match city {
        Some(name) => vec![stored_record(state, name).await?],
        None => state.store.records().await,
    };
    records
        .iter()
        .map(|record| state.engines.report(record).map_err(ApiError::from))
        .collect()
}
