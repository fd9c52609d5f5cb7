use crate::config::RemediationConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Remediation {
    pub required_green_space: f64,
    pub recommended_parks: u64,
    pub recommended_trees: u64,
    pub co2_reduction_potential: f64,
}

/// Sizes the green-space programme needed to close the per-capita deficit.
#[derive(Debug, Clone)]
pub struct RemediationSizer {
    config: RemediationConfig,
}

impl RemediationSizer {
    pub fn new(config: RemediationConfig) -> Self {
        Self { config }
    }

    pub fn size(&self, population: u64, green_per_capita: f64, standard: f64) -> Remediation {
        let required_green_space = required_green_space(population, green_per_capita, standard);
        let recommended_parks = self.parks(required_green_space);
        let recommended_trees = self.trees(population, required_green_space);

        Remediation {
            required_green_space,
            recommended_parks,
            recommended_trees,
            co2_reduction_potential: self.co2_reduction(recommended_trees),
        }
    }

    pub fn parks(&self, required_area: f64) -> u64 {
        if required_area <= 0.0 || self.config.park_size_km2 <= 0.0 {
            return 0;
        }
        ((required_area / self.config.park_size_km2).floor() as u64).max(1)
    }

    /// Planting density over the missing area, or a maintenance floor when there is no deficit.
    pub fn trees(&self, population: u64, required_area: f64) -> u64 {
        if required_area <= 0.0 {
            let per_capita = (population as f64 * self.config.maintenance_trees_per_capita).floor() as u64;
            return per_capita.max(self.config.maintenance_trees_min);
        }
        // km² -> hectares
        (required_area * 100.0 * self.config.trees_per_hectare).floor() as u64
    }

    pub fn co2_reduction(&self, trees: u64) -> f64 {
        trees as f64 * self.config.co2_kg_per_tree_per_year / 1000.0
    }
}

/// km² of green space missing to reach `standard` m² per inhabitant.
pub fn required_green_space(population: u64, green_per_capita: f64, standard: f64) -> f64 {
    if green_per_capita >= standard {
        return 0.0;
    }
    (standard - green_per_capita) * population as f64 / 1_000_000.0
}
