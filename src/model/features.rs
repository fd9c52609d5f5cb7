use crate::city::CityRecord;

pub const FEATURE_COUNT: usize = 11;

/// Human-readable names reported by feature importance.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Population Density",
    "Green Space Area",
    "Green Coverage %",
    "AQI",
    "PM2.5",
    "PM10",
    "Vehicle Count",
    "Public Transport %",
    "Built-up %",
    "Parks",
    "Tree Coverage",
];

pub type FeatureVector = [f64; FEATURE_COUNT];

pub fn feature_vector(city: &CityRecord) -> FeatureVector {
    [
        city.population_density,
        city.green_space_area,
        city.green_coverage_percentage,
        city.aqi,
        city.pm25,
        city.pm10,
        city.vehicle_count as f64,
        city.public_transport_usage,
        city.built_up_percentage,
        city.existing_parks as f64,
        city.tree_coverage,
    ]
}
