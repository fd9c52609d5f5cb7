use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use urban_sustain::city::sample_cities;
use urban_sustain::config::ModelConfig;
use urban_sustain::model::{compare, feature_vector, FEATURE_COUNT, FEATURE_NAMES};
use urban_sustain::{
    CityAnalyzer, CityRecord, FeatureModel, ModelError, ModelHandle, TrafficDensity, TrainedModel,
};

fn training_cities(count: usize, seed: u64) -> Vec<CityRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let traffic = match index % 3 {
                0 => TrafficDensity::Low,
                1 => TrafficDensity::Medium,
                _ => TrafficDensity::High,
            };
            let mut city = CityRecord::new(
                format!("City {}", index),
                rng.gen_range(50.0..800.0),
                rng.gen_range(100_000..10_000_000),
                rng.gen_range(20.0..95.0),
                rng.gen_range(1.0..120.0),
                rng.gen_range(2.0..60.0),
                traffic,
            );
            city.aqi = rng.gen_range(20.0..300.0);
            city.pm25 = rng.gen_range(5.0..120.0);
            city.pm10 = rng.gen_range(10.0..200.0);
            city.vehicle_count = rng.gen_range(10_000..5_000_000);
            city.public_transport_usage = rng.gen_range(5.0..70.0);
            city.existing_parks = rng.gen_range(0..200);
            city.tree_coverage = rng.gen_range(0.0..40.0);
            city
        })
        .collect()
}

fn small_config() -> ModelConfig {
    ModelConfig {
        trees: 25,
        ..ModelConfig::default()
    }
}

#[test]
fn feature_vector_has_fixed_order() {
    let city = &sample_cities()[0];
    let features = feature_vector(city);

    assert_eq!(features.len(), FEATURE_COUNT);
    assert!((features[0] - city.population_density).abs() < 1e-9);
    assert!((features[3] - city.aqi).abs() < 1e-9);
    assert!((features[6] - city.vehicle_count as f64).abs() < 1e-9);
    assert!((features[9] - city.existing_parks as f64).abs() < 1e-9);
    assert!((features[10] - city.tree_coverage).abs() < 1e-9);
}

#[test]
fn refuses_too_few_samples() {
    let cities = training_cities(4, 1);
    let targets = vec![50.0; 4];
    let err = FeatureModel::default().train(&cities, &targets).unwrap_err();

    assert!(matches!(
        err,
        ModelError::InsufficientTrainingData {
            required: 5,
            found: 4
        }
    ));
}

#[test]
fn rejects_mismatched_or_non_finite_targets() {
    let cities = training_cities(6, 2);
    let model = FeatureModel::default();

    let err = model.train(&cities, &[1.0; 5]).unwrap_err();
    assert!(matches!(err, ModelError::TargetCountMismatch { records: 6, targets: 5 }));

    let mut targets = vec![40.0; 6];
    targets[3] = f64::INFINITY;
    let err = model.train(&cities, &targets).unwrap_err();
    assert!(matches!(err, ModelError::InvalidTarget { index: 3 }));
}

#[test]
fn untrained_handle_reports_unavailable() {
    let handle = ModelHandle::new();
    let city = &sample_cities()[1];

    assert!(!handle.is_trained());
    assert!(matches!(handle.predict(city), Err(ModelError::Untrained)));
    assert!(matches!(handle.feature_importance(), Err(ModelError::Untrained)));

    let comparison = compare(&handle, &CityAnalyzer::default(), city).unwrap();
    assert!(!comparison.model_trained);
    assert!(comparison.ml_prediction.is_none());
    assert!(comparison.difference.is_none());
    assert!(comparison.rule_based_score > 0.0);
}

#[test]
fn predictions_stay_within_the_training_range() {
    let analyzer = CityAnalyzer::default();
    let cities = training_cities(60, 3);
    let trained = FeatureModel::new(small_config())
        .train_from_analyzer(&analyzer, &cities)
        .unwrap();
    let targets: Vec<f64> = cities
        .iter()
        .map(|city| analyzer.analyze(city).unwrap().sustainability_score)
        .collect();
    let low = targets.iter().cloned().fold(f64::INFINITY, f64::min);
    let high = targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    assert_eq!(trained.training_samples(), 60);
    for city in training_cities(20, 99).iter().chain(&sample_cities()) {
        let prediction = trained.predict(city);
        assert!(prediction >= low - 1e-9 && prediction <= high + 1e-9);
    }
}

#[test]
fn feature_importance_is_sorted_and_normalized() {
    let cities = training_cities(40, 4);
    let trained = FeatureModel::new(small_config())
        .train_from_analyzer(&CityAnalyzer::default(), &cities)
        .unwrap();
    let importance = trained.feature_importance();

    assert_eq!(importance.len(), FEATURE_COUNT);
    for pair in importance.windows(2) {
        assert!(pair[0].weight >= pair[1].weight);
    }
    let total: f64 = importance.iter().map(|feature| feature.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);
    for name in FEATURE_NAMES {
        assert!(importance.iter().any(|feature| feature.name == name));
    }
}

#[test]
fn constant_targets_give_flat_model() {
    let cities = training_cities(10, 5);
    let trained = FeatureModel::new(small_config())
        .train(&cities, &[42.0; 10])
        .unwrap();

    assert!((trained.predict(&cities[0]) - 42.0).abs() < 1e-9);
    assert!(trained
        .feature_importance()
        .iter()
        .all(|feature| feature.weight == 0.0));
}

#[test]
fn training_is_deterministic() {
    let cities = training_cities(30, 6);
    let analyzer = CityAnalyzer::default();
    let model = FeatureModel::new(small_config());
    let first = model.train_from_analyzer(&analyzer, &cities).unwrap();
    let second = model.train_from_analyzer(&analyzer, &cities).unwrap();

    assert_eq!(first, second);
}

#[test]
fn installed_model_serves_predictions() {
    let analyzer = CityAnalyzer::default();
    let cities = training_cities(30, 7);
    let trained = FeatureModel::new(small_config())
        .train_from_analyzer(&analyzer, &cities)
        .unwrap();
    let expected = trained.predict(&cities[0]);

    let handle = ModelHandle::new();
    handle.install(trained);
    let snapshot = handle.snapshot().unwrap();

    assert!((handle.predict(&cities[0]).unwrap() - expected).abs() < 1e-9);
    assert_eq!(handle.feature_importance().unwrap().len(), FEATURE_COUNT);

    let comparison = compare(&handle, &analyzer, &cities[0]).unwrap();
    assert!(comparison.model_trained);
    let difference = (expected - comparison.rule_based_score).abs();
    assert!((comparison.difference.unwrap() - difference).abs() < 1e-9);

    let replacement = FeatureModel::new(small_config())
        .train(&cities, &vec![10.0; cities.len()])
        .unwrap();
    handle.install(replacement);
    assert!((handle.predict(&cities[0]).unwrap() - 10.0).abs() < 1e-9);
    assert!((snapshot.predict(&cities[0]) - expected).abs() < 1e-9);
    assert_eq!(Arc::strong_count(&snapshot), 1);
}

#[test]
fn saved_model_loads_back() {
    let cities = training_cities(20, 8);
    let trained = FeatureModel::new(small_config())
        .train_from_analyzer(&CityAnalyzer::default(), &cities)
        .unwrap();

    let path = std::env::temp_dir().join(format!(
        "urban-sustain-model-{}.json",
        std::process::id()
    ));
    trained.save(&path).unwrap();
    let loaded = TrainedModel::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.training_samples(), 20);
    for city in &cities {
        assert!((loaded.predict(city) - trained.predict(city)).abs() < 1e-6);
    }
}
