use urban_sustain::planner::{
    PriorityLevel, Severity, Timeframe, WeaknessCategory,
};
use urban_sustain::{AnalyzerConfig, CityAnalyzer, CityRecord, PersonalizedPlanner, TrafficDensity};

fn congested_city() -> CityRecord {
    let mut city = CityRecord::new("Chennai", 426.0, 7_088_000, 65.0, 15.0, 3.5, TrafficDensity::High);
    city.aqi = 120.0;
    city.pm10 = 85.0;
    city.existing_parks = 25;
    city.vehicle_count = 4_500_000;
    city.public_transport_usage = 35.0;
    city
}

fn healthy_city() -> CityRecord {
    let mut city = CityRecord::new("Leafy", 100.0, 500_000, 40.0, 10.0, 40.0, TrafficDensity::Low);
    city.aqi = 40.0;
    city.tree_coverage = 25.0;
    city.public_transport_usage = 60.0;
    city
}

fn plan_for(city: &CityRecord) -> urban_sustain::ActionPlan {
    let metrics = CityAnalyzer::default().analyze(city).unwrap();
    PersonalizedPlanner::default().plan(city, &metrics)
}

fn action_names(actions: &[urban_sustain::planner::PlannedAction]) -> Vec<&str> {
    actions.iter().map(|action| action.action.as_str()).collect()
}

#[test]
fn detects_weaknesses_with_severities() {
    let plan = plan_for(&congested_city());
    let weaknesses = &plan.weaknesses;

    assert_eq!(weaknesses.severity_of(WeaknessCategory::AirQuality), Some(Severity::High));
    assert_eq!(weaknesses.severity_of(WeaknessCategory::GreenSpace), Some(Severity::Critical));
    assert_eq!(weaknesses.severity_of(WeaknessCategory::Traffic), Some(Severity::High));
    assert_eq!(weaknesses.severity_of(WeaknessCategory::UrbanDensity), None);
    assert_eq!(weaknesses.severity_of(WeaknessCategory::TreeCoverage), Some(Severity::Medium));
    assert_eq!(weaknesses.len(), 4);

    let air = weaknesses.air_quality.as_ref().unwrap();
    assert!((air.gap - 70.0).abs() < 1e-9);
    assert!(air.main_cause.is_none());

    let green = weaknesses.green_space.as_ref().unwrap();
    assert!((green.total_deficit_sqkm - 48.792).abs() < 1e-6);

    let trees = weaknesses.tree_coverage.as_ref().unwrap();
    assert!((trees.gap - 20.0).abs() < 1e-9);
}

#[test]
fn critical_air_names_its_main_cause() {
    let mut city = congested_city();
    city.aqi = 180.0;
    city.pm25 = 70.0;
    let plan = plan_for(&city);

    let air = plan.weaknesses.air_quality.as_ref().unwrap();
    assert_eq!(air.severity, Severity::Critical);
    assert_eq!(air.main_cause.as_deref(), Some("High PM2.5 and PM10 levels"));
    assert_eq!(plan.short_term[0].action, "Emergency Air Quality Response");

    city.pm25 = 40.0;
    let plan = plan_for(&city);
    let air = plan.weaknesses.air_quality.as_ref().unwrap();
    assert_eq!(air.main_cause.as_deref(), Some("Traffic emissions"));
}

#[test]
fn actions_follow_the_weaknesses() {
    let plan = plan_for(&congested_city());

    assert_eq!(
        action_names(plan.actions(Timeframe::ShortTerm)),
        vec!["Anti-Dust Campaign", "Rapid Greening Initiative", "Smart Traffic Management"]
    );
    assert_eq!(
        action_names(&plan.mid_term),
        vec![
            "Urban Forest Development",
            "Rooftop Garden Program",
            "Clean Energy Transition",
            "Dedicated Bus Corridors",
        ]
    );
    assert_eq!(
        action_names(&plan.long_term),
        vec![
            "Smart Sustainable City Vision 2030",
            "Green Belt Development",
            "Zero Emission Zone",
            "Climate Resilient Infrastructure",
        ]
    );

    let greening = &plan.short_term[1];
    assert_eq!(greening.description, "Plant 7,088 trees in Chennai");
    assert_eq!(greening.steps[0], "Identify 12 vacant plots");
    assert_eq!(greening.quantity.as_ref().map(|q| q.amount), Some(7_088.0));

    let quantity = |name: &str| {
        plan.mid_term
            .iter()
            .chain(&plan.long_term)
            .find(|action| action.action == name)
            .and_then(|action| action.quantity.as_ref())
            .map(|quantity| quantity.amount)
    };
    assert_eq!(quantity("Urban Forest Development"), Some(97.0));
    assert_eq!(quantity("Rooftop Garden Program"), Some(708.0));
    assert_eq!(quantity("Dedicated Bus Corridors"), Some(213.0));
    assert_eq!(quantity("Green Belt Development"), Some(42.0));

    assert!(plan.long_term[0].specific_to.ends_with(&format!(
        "{:.1}",
        CityAnalyzer::default()
            .analyze(&congested_city())
            .unwrap()
            .sustainability_score
    )));
}

#[test]
fn priority_impact_and_budget() {
    let plan = plan_for(&congested_city());

    assert_eq!(plan.overall_priority, PriorityLevel::Critical);
    assert_eq!(plan.overall_priority.label(), "CRITICAL - Immediate action required");

    let impact = &plan.estimated_impact;
    assert!((impact.by_category[&WeaknessCategory::GreenSpace] - 20.0).abs() < 1e-9);
    assert!((impact.by_category[&WeaknessCategory::AirQuality] - 16.0).abs() < 1e-9);
    assert!((impact.by_category[&WeaknessCategory::TreeCoverage] - 12.0).abs() < 1e-9);
    assert!((impact.total_potential - 64.0).abs() < 1e-9);
    assert!((impact.target_score - 100.0).abs() < 1e-9);

    let budget = &plan.budget_estimate;
    assert!((budget.severity_multiplier - 6.0).abs() < 1e-9);
    assert!((budget.per_capita - 3_000.0).abs() < 1e-9);
    assert!((budget.total - 21_264_000_000.0).abs() < 1.0);
    assert!((budget.short_term - budget.total * 0.2).abs() < 1.0);
    assert!((budget.mid_term - budget.total * 0.5).abs() < 1.0);
    assert!((budget.long_term - budget.total * 0.3).abs() < 1.0);
}

#[test]
fn healthy_city_keeps_only_the_standing_programmes() {
    let plan = plan_for(&healthy_city());

    assert!(plan.weaknesses.is_empty());
    assert_eq!(plan.overall_priority, PriorityLevel::Low);
    assert!(plan.short_term.is_empty());
    assert!(plan.mid_term.is_empty());
    assert_eq!(plan.long_term.len(), 2);
    assert!((plan.estimated_impact.total_potential - 0.0).abs() < 1e-9);
    assert!((plan.estimated_impact.target_score - 50.0).abs() < 1e-9);
    assert!((plan.budget_estimate.total - 0.0).abs() < 1e-9);
}

#[test]
fn priority_bands_follow_config() {
    let mut config = AnalyzerConfig::default();
    config.planner.critical_priority_below = 95.0;
    let city = healthy_city();
    let metrics = CityAnalyzer::new(&config).analyze(&city).unwrap();
    let plan = PersonalizedPlanner::new(&config).plan(&city, &metrics);

    assert_eq!(plan.overall_priority, PriorityLevel::Critical);
}

#[test]
fn dense_city_flags_urban_density() {
    let mut city = healthy_city();
    city.built_up_percentage = 75.0;
    let plan = plan_for(&city);

    let density = plan.weaknesses.urban_density.as_ref().unwrap();
    assert_eq!(density.severity, Severity::Medium);
    assert!((density.available_space - 25.0).abs() < 1e-9);
    assert!((plan.budget_estimate.per_capita - 500.0).abs() < 1e-9);
}
