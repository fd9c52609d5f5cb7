use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, warn};
use urban_sustain::CityRecord;

const GEOAPIFY_BASE: &str = "https://api.geoapify.com/v1";
const OPENWEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5";
const PLACEHOLDER_KEYS: [&str; 2] = ["your_geoapify_api_key_here", "your_openweather_api_key_here"];

const SUGGESTION_LIMIT: usize = 5;
const MIN_SUGGESTION_QUERY: usize = 2;

/// Index 1-5 from OpenWeather scaled onto the 0-500 AQI range.
const AQI_INDEX_SCALE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirPollution {
    pub index: f64,
    pub pm25: f64,
    pub pm10: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySuggestion {
    pub city: String,
    pub display: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Fills coordinates and missing air-quality figures from public APIs.
#[derive(Clone)]
pub struct Enricher {
    client: reqwest::Client,
    geoapify_key: Option<String>,
    openweather_key: Option<String>,
    geoapify_base: String,
    openweather_base: String,
}

impl Enricher {
    pub fn from_env() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| format!("failed to build http client: {}", err))?;
        Ok(Self {
            client,
            geoapify_key: api_key("GEOAPIFY_API_KEY"),
            openweather_key: api_key("OPENWEATHER_API_KEY"),
            geoapify_base: env::var("GEOAPIFY_API_BASE")
                .unwrap_or_else(|_| GEOAPIFY_BASE.to_string()),
            openweather_base: env::var("OPENWEATHER_API_BASE")
                .unwrap_or_else(|_| OPENWEATHER_BASE.to_string()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.geoapify_key.is_some()
    }

    pub async fn geocode(&self, city_name: &str) -> Result<Option<(f64, f64)>, String> {
        let Some(key) = self.geoapify_key.as_deref() else {
            return Err("GEOAPIFY_API_KEY is not set".to_string());
        };
        let url = format!(
            "{}/geocode/search?text={}&limit=1&format=json&apiKey={}",
            self.geoapify_base.trim_end_matches('/'),
            urlencoding::encode(city_name),
            urlencoding::encode(key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("geocoding request failed: {}", err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("geocoding API error: {}", status));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| format!("geocoding response parse failed: {}", err))?;
        Ok(body
            .results
            .first()
            .and_then(|result| Some((result.lat?, result.lon?))))
    }

    /// City-name autocomplete restricted to Indian cities. Queries shorter than two
    /// characters return nothing without a request.
    pub async fn suggest(&self, query: &str) -> Result<Vec<CitySuggestion>, String> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Ok(Vec::new());
        }
        let Some(key) = self.geoapify_key.as_deref() else {
            return Err("GEOAPIFY_API_KEY is not set".to_string());
        };
        let url = format!(
            "{}/geocode/autocomplete?text={}&limit={}&type=city&filter=countrycode:in&format=json&apiKey={}",
            self.geoapify_base.trim_end_matches('/'),
            urlencoding::encode(query),
            SUGGESTION_LIMIT,
            urlencoding::encode(key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("autocomplete request failed: {}", err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("autocomplete API error: {}", status));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| format!("autocomplete response parse failed: {}", err))?;
        Ok(suggestions_from(body.results))
    }

    pub async fn air_pollution(&self, latitude: f64, longitude: f64) -> Result<Option<AirPollution>, String> {
        let Some(key) = self.openweather_key.as_deref() else {
            return Err("OPENWEATHER_API_KEY is not set".to_string());
        };
        let url = format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            self.openweather_base.trim_end_matches('/'),
            latitude,
            longitude,
            urlencoding::encode(key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("air pollution request failed: {}", err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("air pollution API error: {}", status));
        }

        let body: PollutionResponse = response
            .json()
            .await
            .map_err(|err| format!("air pollution response parse failed: {}", err))?;
        Ok(body.list.first().map(|entry| AirPollution {
            index: entry.main.aqi,
            pm25: entry.components.pm2_5.unwrap_or_default(),
            pm10: entry.components.pm10.unwrap_or_default(),
        }))
    }

    /// Returns an enriched copy. Lookup failures leave the record as it was.
    pub async fn enrich(&self, city: &CityRecord) -> CityRecord {
        let mut enriched = city.clone();

        let coordinates = match self.geocode(&city.name).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => {
                debug!(city = %city.name, "no coordinates found");
                return enriched;
            }
            Err(err) => {
                warn!(city = %city.name, error = %err, "geocoding failed");
                return enriched;
            }
        };
        enriched.latitude = Some(coordinates.0);
        enriched.longitude = Some(coordinates.1);

        match self.air_pollution(coordinates.0, coordinates.1).await {
            Ok(Some(pollution)) => apply_pollution(&mut enriched, pollution),
            Ok(None) => debug!(city = %city.name, "no air pollution data"),
            Err(err) => warn!(city = %city.name, error = %err, "air pollution lookup failed"),
        }
        enriched
    }
}

/// Only figures that are still zero get replaced.
pub fn apply_pollution(city: &mut CityRecord, pollution: AirPollution) {
    if city.aqi == 0.0 {
        city.aqi = pollution.index * AQI_INDEX_SCALE;
    }
    if city.pm25 == 0.0 {
        city.pm25 = pollution.pm25;
    }
    if city.pm10 == 0.0 {
        city.pm10 = pollution.pm10;
    }
}

fn suggestions_from(results: Vec<GeocodeResult>) -> Vec<CitySuggestion> {
    results
        .into_iter()
        .filter(|result| result.country.as_deref() == Some("India"))
        .filter_map(|result| {
            let city = result
                .city
                .or(result.name)
                .filter(|name| !name.trim().is_empty())?;
            let display = match result.state.as_deref() {
                Some(state) if !state.is_empty() => format!("{}, {}", city, state),
                _ => city.clone(),
            };
            Some(CitySuggestion {
                city,
                display,
                lat: result.lat,
                lon: result.lon,
            })
        })
        .collect()
}

fn api_key(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !PLACEHOLDER_KEYS.contains(&value.as_str()))
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionEntry>,
}

#[derive(Deserialize)]
struct PollutionEntry {
    main: PollutionIndex,
    components: PollutionComponents,
}

#[derive(Deserialize)]
struct PollutionIndex {
    aqi: f64,
}

#[derive(Deserialize)]
struct PollutionComponents {
    pm2_5: Option<f64>,
    pm10: Option<f64>,
}
