use urban_sustain::city::sample_cities;
use urban_sustain::export::{write_csv, write_json};
use urban_sustain::{build_report, CityReport, Engines, ExportRow, RecommendationEngine};

fn reports() -> Vec<CityReport> {
    let engines = Engines::default();
    sample_cities()
        .iter()
        .map(|city| engines.report(city).unwrap())
        .collect()
}

#[test]
fn csv_uses_report_headers() {
    let reports = reports();
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &reports).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();

    assert_eq!(
        lines.next(),
        Some(
            "City,Sustainability Score,Category,Green Space per Capita,WHO Compliance,\
             Required Green Space,Recommended Parks,Recommended Trees,CO2 Reduction Potential"
        )
    );
    assert_eq!(lines.count(), reports.len());
}

#[test]
fn csv_rows_read_back() {
    let reports = reports();
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &reports).unwrap();

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let rows: Vec<ExportRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();

    assert_eq!(rows.len(), reports.len());
    assert_eq!(rows[0].city, "Mumbai");
    assert_eq!(rows[0].category, reports[0].metrics.category.label());
    assert_eq!(rows[0].recommended_trees, reports[0].metrics.recommended_trees);
    assert!((rows[0].sustainability_score - reports[0].metrics.sustainability_score).abs() < 1e-9);
}

#[test]
fn json_export_is_nested() {
    let reports = reports();
    let mut buffer = Vec::new();
    write_json(&mut buffer, &reports).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    let first = &value[0];
    assert_eq!(first["city"]["name"], "Mumbai");
    assert!(first["metrics"]["score_explanation"]["green_space"]["score"].is_number());
    assert!(first["metrics"]["sustainability_debt"]["total_debt"].is_number());
    assert!(first["recommendations"]["long_term"].is_array());
}

#[test]
fn built_report_matches_engine_report() {
    let engines = Engines::default();
    let city = &sample_cities()[2];
    let metrics = engines.analyzer.analyze(city).unwrap();
    let recommendations = RecommendationEngine::default().recommend(city, &metrics);

    assert_eq!(
        build_report(city, &metrics, &recommendations),
        engines.report(city).unwrap()
    );
}
