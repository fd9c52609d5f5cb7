use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::city::CityRecord;
use crate::error::StoreError;
use crate::scoring::SustainabilityMetrics;
use crate::simulation::{Scenario, SimulationResult};

const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub created_at_ms: u64,
    pub metrics: SustainabilityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEntry {
    pub created_at_ms: u64,
    pub scenarios: Vec<Scenario>,
    pub original_score: f64,
    pub new_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCity {
    pub record: CityRecord,
    /// Newest first.
    #[serde(default)]
    pub analyses: Vec<AnalysisEntry>,
    /// Newest first.
    #[serde(default)]
    pub simulations: Vec<SimulationEntry>,
}

impl StoredCity {
    pub fn latest_analysis(&self) -> Option<&AnalysisEntry> {
        self.analyses.first()
    }
}

/// Cities keyed by name, persisted as one JSON document.
pub struct CityStore {
    path: PathBuf,
    cities: RwLock<BTreeMap<String, StoredCity>>,
}

impl CityStore {
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let cities = if path.exists() {
            let data = tokio::fs::read_to_string(&path).await?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cities: RwLock::new(cities),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Vec<StoredCity> {
        let guard = self.cities.read().await;
        guard.values().cloned().collect()
    }

    pub async fn records(&self) -> Vec<CityRecord> {
        let guard = self.cities.read().await;
        guard.values().map(|city| city.record.clone()).collect()
    }

    pub async fn get(&self, name: &str) -> Option<StoredCity> {
        let guard = self.cities.read().await;
        guard.get(name).cloned()
    }

    /// Inserts or replaces a record. Replacing keeps the city's history.
    pub async fn upsert(&self, record: CityRecord) -> Result<StoredCity, StoreError> {
        let mut guard = self.cities.write().await;
        let stored = match guard.remove(&record.name) {
            Some(mut existing) => {
                existing.record = record;
                existing
            }
            None => StoredCity {
                record,
                analyses: Vec::new(),
                simulations: Vec::new(),
            },
        };
        guard.insert(stored.record.name.clone(), stored.clone());
        self.persist(&guard).await?;
        Ok(stored)
    }

    pub async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut guard = self.cities.write().await;
        let removed = guard.remove(name).is_some();
        if removed {
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    /// Removes every city. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let mut guard = self.cities.write().await;
        let removed = guard.len();
        guard.clear();
        self.persist(&guard).await?;
        Ok(removed)
    }

    pub async fn record_analysis(
        &self,
        name: &str,
        metrics: SustainabilityMetrics,
    ) -> Result<AnalysisEntry, StoreError> {
        let mut guard = self.cities.write().await;
        let city = guard
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let entry = AnalysisEntry {
            created_at_ms: now_ms(),
            metrics,
        };
        city.analyses.insert(0, entry.clone());
        city.analyses.truncate(MAX_HISTORY);
        self.persist(&guard).await?;
        Ok(entry)
    }

    pub async fn record_simulation(
        &self,
        name: &str,
        result: &SimulationResult,
    ) -> Result<SimulationEntry, StoreError> {
        let mut guard = self.cities.write().await;
        let city = guard
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let entry = SimulationEntry {
            created_at_ms: now_ms(),
            scenarios: result.scenarios.clone(),
            original_score: result.original_metrics.sustainability_score,
            new_score: result.new_metrics.sustainability_score,
        };
        city.simulations.insert(0, entry.clone());
        city.simulations.truncate(MAX_HISTORY);
        self.persist(&guard).await?;
        Ok(entry)
    }

    async fn persist(&self, cities: &BTreeMap<String, StoredCity>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_string_pretty(cities)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}
