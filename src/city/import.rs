use std::io::Read;
use std::path::Path;

use crate::city::input::CityInput;
use crate::city::record::{CityRecord, TrafficDensity};
use crate::error::ImportError;

/// Loads every city of a `.csv` or `.json` file. Column and key names match the
/// `CityRecord` field names.
pub fn load_cities(path: &Path) -> Result<Vec<CityRecord>, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)?;
            read_csv(file)
        }
        "json" => {
            let contents = std::fs::read_to_string(path)?;
            read_json(&contents)
        }
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CityRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cities = Vec::new();
    for (index, row) in reader.deserialize::<CityInput>().enumerate() {
        let input = row?;
        // header is row 1
        let city = input
            .validate()
            .map_err(|source| ImportError::Row { row: index + 2, source })?;
        cities.push(city);
    }
    Ok(cities)
}

/// Accepts either a JSON array of cities or a single city object.
pub fn read_json(contents: &str) -> Result<Vec<CityRecord>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    let inputs: Vec<CityInput> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            input
                .validate()
                .map_err(|source| ImportError::Row { row: index + 1, source })
        })
        .collect()
}

/// Demonstration data set of six Indian cities.
pub fn sample_cities() -> Vec<CityRecord> {
    vec![
        sample(
            ("Mumbai", 603.4, 12_442_373, 20_634.0),
            (85.0, 30.2, 50.1, 15.0, 45, 12.0),
            (156.0, 78.0, 112.0, 2340.0),
            (TrafficDensity::High, 2_800_000, 45.0),
        ),
        sample(
            ("Pune", 331.3, 3_124_458, 9_429.0),
            (70.0, 49.7, 82.3, 25.0, 78, 22.0),
            (89.0, 45.0, 67.0, 890.0),
            (TrafficDensity::Medium, 1_200_000, 35.0),
        ),
        sample(
            ("Nashik", 264.5, 1_486_973, 5_626.0),
            (60.0, 39.7, 79.4, 30.0, 34, 28.0),
            (76.0, 38.0, 58.0, 670.0),
            (TrafficDensity::Low, 450_000, 25.0),
        ),
        sample(
            ("Nagpur", 227.4, 2_405_421, 10_576.0),
            (65.0, 34.1, 68.2, 20.0, 56, 18.0),
            (98.0, 52.0, 78.0, 1120.0),
            (TrafficDensity::Medium, 890_000, 30.0),
        ),
        sample(
            ("Chennai", 426.0, 7_088_000, 16_632.0),
            (65.0, 15.0, 10.0, 3.5, 25, 12.0),
            (120.0, 45.0, 85.0, 15_000.0),
            (TrafficDensity::High, 4_500_000, 35.0),
        ),
        sample(
            ("Bangalore", 741.0, 8_443_675, 11_391.0),
            (60.0, 50.0, 25.0, 6.7, 45, 20.0),
            (100.0, 38.0, 75.0, 18_000.0),
            (TrafficDensity::High, 6_000_000, 30.0),
        ),
    ]
}

fn sample(
    (name, area, population, density): (&str, f64, u64, f64),
    (built_up, green_space, open_land, green_coverage, parks, trees): (f64, f64, f64, f64, u32, f64),
    (aqi, pm25, pm10, co2): (f64, f64, f64, f64),
    (traffic, vehicles, transport): (TrafficDensity, u64, f64),
) -> CityRecord {
    let mut city = CityRecord::new(name, area, population, built_up, green_space, green_coverage, traffic);
    city.population_density = density;
    city.open_land_area = open_land;
    city.existing_parks = parks;
    city.tree_coverage = trees;
    city.aqi = aqi;
    city.pm25 = pm25;
    city.pm10 = pm10;
    city.co2_estimation = co2;
    city.vehicle_count = vehicles;
    city.public_transport_usage = transport;
    city
}
