use urban_sustain::city::{read_csv, read_json, sample_cities};
use urban_sustain::{CityInput, ImportError, TrafficDensity};

fn minimal_input() -> CityInput {
    CityInput {
        name: Some("Nashik".to_string()),
        area: Some(264.5),
        population: Some(1_486_973.0),
        built_up_percentage: Some(60.0),
        green_space_area: Some(39.7),
        green_coverage_percentage: Some(30.0),
        traffic_density: Some("low".to_string()),
        ..CityInput::default()
    }
}

#[test]
fn optional_fields_default_to_zero_and_density_is_derived() {
    let record = minimal_input().validate().unwrap();

    assert_eq!(record.population, 1_486_973);
    assert_eq!(record.traffic_density, TrafficDensity::Low);
    assert!((record.population_density - 1_486_973.0 / 264.5).abs() < 1e-6);
    assert_eq!(record.existing_parks, 0);
    assert_eq!(record.vehicle_count, 0);
    assert!((record.tree_coverage - 0.0).abs() < 1e-9);
    assert!((record.aqi - 0.0).abs() < 1e-9);
    assert!(record.latitude.is_none());
}

#[test]
fn explicit_density_is_kept() {
    let mut input = minimal_input();
    input.population_density = Some(5_626.0);
    input.existing_parks = Some(34.9);
    let record = input.validate().unwrap();

    assert!((record.population_density - 5_626.0).abs() < 1e-9);
    assert_eq!(record.existing_parks, 34);
}

#[test]
fn every_offending_field_is_reported() {
    let input = CityInput {
        name: Some("  ".to_string()),
        area: Some(-3.0),
        population: None,
        built_up_percentage: Some(140.0),
        green_space_area: Some(10.0),
        green_coverage_percentage: Some(20.0),
        traffic_density: Some("gridlock".to_string()),
        aqi: Some(-5.0),
        latitude: Some(95.0),
        ..CityInput::default()
    };
    let err = input.validate().unwrap_err();

    for field in [
        "name",
        "area",
        "population",
        "built_up_percentage",
        "traffic_density",
        "aqi",
        "latitude",
    ] {
        assert!(err.has_field(field), "missing error for {}", field);
    }
    assert!(!err.has_field("green_space_area"));
}

#[test]
fn traffic_density_parses_loosely() {
    assert_eq!("HIGH".parse::<TrafficDensity>().unwrap(), TrafficDensity::High);
    assert_eq!(" Moderate ".parse::<TrafficDensity>().unwrap(), TrafficDensity::Medium);
    assert!("jammed".parse::<TrafficDensity>().is_err());
}

#[test]
fn reads_csv_rows() {
    let data = "\
name,area,population,built_up_percentage,green_space_area,green_coverage_percentage,traffic_density,aqi,vehicle_count
Pune,331.26,3124458,70,49.7,25,Medium,89,1200000
Nagpur, 227.4 ,2405421,65,34.1,20,medium,,
";
    let cities = read_csv(data.as_bytes()).unwrap();

    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].name, "Pune");
    assert_eq!(cities[0].vehicle_count, 1_200_000);
    assert!((cities[1].area - 227.4).abs() < 1e-9);
    assert!((cities[1].aqi - 0.0).abs() < 1e-9);
}

#[test]
fn csv_row_errors_carry_the_line_number() {
    let data = "\
name,area,population,built_up_percentage,green_space_area,green_coverage_percentage,traffic_density
Pune,331.26,3124458,70,49.7,25,Medium
Broken,0,100,50,1,10,High
";
    let err = read_csv(data.as_bytes()).unwrap_err();
    match err {
        ImportError::Row { row, source } => {
            assert_eq!(row, 3);
            assert!(source.has_field("area"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn reads_json_array_and_single_object() {
    let array = r#"[
        {"name": "Pune", "area": 331.26, "population": 3124458, "built_up_percentage": 70,
         "green_space_area": 49.7, "green_coverage_percentage": 25, "traffic_density": "Medium"},
        {"name": "Nashik", "area": 264.5, "population": 1486973, "built_up_percentage": 60,
         "green_space_area": 39.7, "green_coverage_percentage": 30, "traffic_density": "Low",
         "latitude": 19.99, "longitude": 73.78}
    ]"#;
    let cities = read_json(array).unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[1].latitude, Some(19.99));

    let single = r#"{"name": "Pune", "area": 331.26, "population": 3124458,
        "built_up_percentage": 70, "green_space_area": 49.7,
        "green_coverage_percentage": 25, "traffic_density": "High"}"#;
    let cities = read_json(single).unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].traffic_density, TrafficDensity::High);
}

#[test]
fn sample_cities_are_valid_and_round_trip_through_input() {
    let cities = sample_cities();
    assert_eq!(cities.len(), 6);

    for city in &cities {
        city.validate().unwrap();
        let rebuilt = CityInput::from(city).validate().unwrap();
        assert_eq!(&rebuilt, city);
    }
}
