use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use urban_sustain::scoring::components::{
    air_quality_score, green_space_score, land_use_score, transport_score,
};
use urban_sustain::config::ComponentWeights;
use urban_sustain::{AnalyzerConfig, BadgeLevel, Category, CityAnalyzer, CityRecord, TrafficDensity};

fn coastal_city() -> CityRecord {
    let mut city = CityRecord::new("Chennai", 426.0, 7_088_000, 65.0, 15.0, 3.5, TrafficDensity::High);
    city.aqi = 120.0;
    city.public_transport_usage = 35.0;
    city
}

fn random_city(rng: &mut StdRng) -> CityRecord {
    let traffic = match rng.gen_range(0..3) {
        0 => TrafficDensity::Low,
        1 => TrafficDensity::Medium,
        _ => TrafficDensity::High,
    };
    let mut city = CityRecord::new(
        "Random",
        rng.gen_range(10.0..1000.0),
        rng.gen_range(10_000..15_000_000),
        rng.gen_range(0.0..100.0),
        rng.gen_range(0.0..200.0),
        rng.gen_range(0.0..100.0),
        traffic,
    );
    city.aqi = rng.gen_range(0.0..500.0);
    city.public_transport_usage = rng.gen_range(0.0..100.0);
    city.tree_coverage = rng.gen_range(0.0..100.0);
    city
}

#[test]
fn scores_the_reference_city() {
    let analyzer = CityAnalyzer::default();
    let metrics = analyzer.analyze(&coastal_city()).unwrap();
    let explanation = &metrics.score_explanation;

    assert!((metrics.green_space_per_capita - 2.1163).abs() < 1e-3);
    assert!((explanation.green_space.score - 18.8).abs() < 1e-9);
    assert!((explanation.air_quality.score - 42.0).abs() < 1e-9);
    assert!((explanation.traffic.score - 25.0).abs() < 1e-9);
    assert!((explanation.land_use.score - 62.5).abs() < 1e-9);
    assert!((explanation.transport.score - 85.0).abs() < 1e-9);
    assert!((metrics.sustainability_score - 39.0).abs() < 0.05);
    assert_eq!(metrics.category, Category::Poor);
    assert_eq!(metrics.badge_level, BadgeLevel::Poor);
}

#[test]
fn explanation_carries_inputs_and_weights() {
    let metrics = CityAnalyzer::default().analyze(&coastal_city()).unwrap();
    let explanation = &metrics.score_explanation;

    assert!((explanation.green_space.weight - 30.0).abs() < 1e-9);
    assert_eq!(explanation.green_space.standard, Some(9.0));
    assert_eq!(explanation.green_space.status, "Poor");
    assert_eq!(explanation.air_quality.standard, Some(50.0));
    assert_eq!(explanation.air_quality.status, "Unhealthy");
    assert_eq!(explanation.traffic.value.as_number(), None);
    assert_eq!(explanation.traffic.density_factor, Some(1.66));
    assert_eq!(explanation.traffic.status, "High Impact");
    assert_eq!(explanation.land_use.status, "Dense");
    assert_eq!(explanation.transport.status, "Good");

    let total_weight: f64 = explanation
        .components()
        .iter()
        .map(|(_, component)| component.weight)
        .sum();
    assert!((total_weight - 100.0).abs() < 1e-9);
}

#[test]
fn debt_and_remediation_for_reference_city() {
    let metrics = CityAnalyzer::default().analyze(&coastal_city()).unwrap();
    let debt = &metrics.sustainability_debt;

    assert!((debt.green_space_debt - 48.79).abs() < 1e-9);
    assert!((debt.air_quality_debt - 140.0).abs() < 1e-9);
    assert!((debt.traffic_debt - 69.9).abs() < 1e-9);
    assert!((debt.land_use_debt - 5.0).abs() < 1e-9);
    assert!((debt.transport_debt - 5.0).abs() < 1e-9);
    assert!((debt.total_debt - 64.87).abs() < 0.011);

    assert!((metrics.required_green_space - 48.792).abs() < 1e-6);
    assert_eq!(metrics.recommended_parks, 975);
    assert!((487_919..=487_920).contains(&metrics.recommended_trees));
    assert!((metrics.co2_reduction_potential - metrics.recommended_trees as f64 * 0.022).abs() < 1e-6);
    assert!(metrics.who_standard_compliance < 24.0);
}

#[test]
fn compliant_city_gets_maintenance_trees() {
    let mut city = CityRecord::new("Leafy", 100.0, 500_000, 40.0, 10.0, 40.0, TrafficDensity::Low);
    city.public_transport_usage = 60.0;
    let metrics = CityAnalyzer::default().analyze(&city).unwrap();

    assert!((metrics.who_standard_compliance - 100.0).abs() < 1e-9);
    assert!((metrics.required_green_space - 0.0).abs() < 1e-9);
    assert_eq!(metrics.recommended_parks, 0);
    assert_eq!(metrics.recommended_trees, 5_000);
    assert!((metrics.co2_reduction_potential - 110.0).abs() < 1e-9);
    assert!((metrics.sustainability_debt.green_space_debt - 0.0).abs() < 1e-9);

    let small = CityRecord::new("Hamlet", 1.0, 2_000, 10.0, 1.0, 50.0, TrafficDensity::Low);
    let metrics = CityAnalyzer::default().analyze(&small).unwrap();
    assert_eq!(metrics.recommended_trees, 100);
}

#[test]
fn curve_boundaries_are_exact() {
    assert!((air_quality_score(50.0) - 100.0).abs() < 1e-9);
    assert!((air_quality_score(100.0) - 50.0).abs() < 1e-9);
    assert!((air_quality_score(150.0) - 30.0).abs() < 1e-9);
    assert!((air_quality_score(200.0) - 15.0).abs() < 1e-9);
    assert!((air_quality_score(400.0) - 0.0).abs() < 1e-9);

    assert!((land_use_score(60.0) - 70.0).abs() < 1e-9);
    assert!((land_use_score(80.0) - 40.0).abs() < 1e-9);
    assert!((land_use_score(100.0) - 0.0).abs() < 1e-9);

    assert!((green_space_score(1.0) - 80.0).abs() < 1e-9);
    assert!((green_space_score(1.5) - 100.0).abs() < 1e-9);
    assert!((green_space_score(0.5) - 40.0).abs() < 1e-9);

    assert!((transport_score(50.0) - 100.0).abs() < 1e-9);
    assert!((transport_score(30.0) - 80.0).abs() < 1e-9);
    assert!((transport_score(15.0) - 50.0).abs() < 1e-9);
}

#[test]
fn tiers_include_their_lower_bound() {
    let analyzer = CityAnalyzer::default();
    assert_eq!(analyzer.categorize(80.0), BadgeLevel::Excellent);
    assert_eq!(analyzer.categorize(79.99), BadgeLevel::Good);
    assert_eq!(analyzer.categorize(65.0), BadgeLevel::Good);
    assert_eq!(analyzer.categorize(45.0), BadgeLevel::Moderate);
    assert_eq!(analyzer.categorize(44.99), BadgeLevel::Poor);
    assert_eq!(analyzer.categorize(25.0), BadgeLevel::Poor);
    assert_eq!(analyzer.categorize(24.99), BadgeLevel::Critical);

    assert_eq!(analyzer.category(65.0), Category::Sustainable);
    assert_eq!(analyzer.category(45.0), Category::Moderate);
    assert_eq!(analyzer.category(10.0), Category::Poor);
}

#[test]
fn scores_stay_in_range_for_random_cities() {
    let analyzer = CityAnalyzer::default();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..500 {
        let city = random_city(&mut rng);
        let metrics = analyzer.analyze(&city).unwrap();
        assert!((0.0..=100.0).contains(&metrics.sustainability_score));
        assert!((0.0..=100.0).contains(&metrics.who_standard_compliance));
        for (name, component) in metrics.score_explanation.components() {
            assert!(
                (0.0..=100.0).contains(&component.score),
                "{} out of range: {}",
                name,
                component.score
            );
        }
        let debt = &metrics.sustainability_debt;
        for value in [
            debt.green_space_debt,
            debt.air_quality_debt,
            debt.traffic_debt,
            debt.land_use_debt,
            debt.transport_debt,
            debt.total_debt,
        ] {
            assert!(value >= 0.0);
        }
    }
}

#[test]
fn components_move_in_the_expected_direction() {
    let analyzer = CityAnalyzer::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let city = random_city(&mut rng);
        let base = analyzer.score_components(&city);

        let mut greener = city.clone();
        greener.green_space_area += rng.gen_range(0.1..50.0);
        assert!(analyzer.score_components(&greener).green_space.score >= base.green_space.score);

        let mut smoggier = city.clone();
        smoggier.aqi += rng.gen_range(0.1..100.0);
        assert!(analyzer.score_components(&smoggier).air_quality.score <= base.air_quality.score);

        let mut transit = city.clone();
        transit.public_transport_usage = (transit.public_transport_usage + rng.gen_range(0.1..20.0)).min(100.0);
        assert!(analyzer.score_components(&transit).transport.score >= base.transport.score);
    }
}

#[test]
fn analysis_is_idempotent() {
    let analyzer = CityAnalyzer::default();
    let city = coastal_city();
    let first = analyzer.analyze(&city).unwrap();
    let second = analyzer.analyze(&city).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_record_is_rejected_with_every_field() {
    let mut city = CityRecord::new("Nowhere", 0.0, 0, 120.0, -1.0, 20.0, TrafficDensity::Low);
    city.aqi = f64::NAN;
    let err = CityAnalyzer::default().analyze(&city).unwrap_err();

    assert!(err.has_field("area"));
    assert!(err.has_field("population"));
    assert!(err.has_field("built_up_percentage"));
    assert!(err.has_field("green_space_area"));
    assert!(err.has_field("aqi"));
    assert!(!err.has_field("green_coverage_percentage"));
}

#[test]
fn component_ties_round_to_even() {
    let mut city = coastal_city();
    city.public_transport_usage = 32.25;
    let explanation = CityAnalyzer::default().score_components(&city);

    assert_eq!(explanation.transport.score, 82.2);

    city.public_transport_usage = 32.75;
    let explanation = CityAnalyzer::default().score_components(&city);
    assert_eq!(explanation.transport.score, 82.8);
}

#[test]
fn aggregate_ties_round_to_even() {
    let mut config = AnalyzerConfig::default();
    config.weights = ComponentWeights {
        green_space: 0.5,
        air_quality: 0.25,
        traffic: 0.125,
        land_use: 0.125,
        transport: 0.0,
    };
    let analyzer = CityAnalyzer::new(&config);
    let mut explanation = analyzer.score_components(&coastal_city());
    explanation.green_space.score = 20.25;
    explanation.air_quality.score = 0.0;
    explanation.traffic.score = 0.0;
    explanation.land_use.score = 0.0;
    explanation.transport.score = 0.0;

    assert_eq!(analyzer.aggregate(&explanation), 10.12);

    explanation.green_space.score = 20.75;
    assert_eq!(analyzer.aggregate(&explanation), 10.38);
}
