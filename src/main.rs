mod api;
mod enrich;
mod server;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use urban_sustain::city::{load_cities, sample_cities};
use urban_sustain::export::{write_csv, write_json, CityReport};
use urban_sustain::model::{compare, ModelHandle, TrainedModel};
use urban_sustain::{
    format_float, format_number, AnalyzerConfig, CityRecord, Engines, ScenarioSet,
};

#[derive(Parser)]
#[command(name = "urban-sustain", about = "City sustainability scoring engine")]
struct Cli {
    /// TOML config file (defaults to SUSTAIN_CONFIG_PATH or config/sustainability.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score cities and print their reports.
    Analyze(AnalyzeArgs),
    /// Build a personalized action plan for one city.
    Plan(CityArgs),
    /// Run what-if scenarios against one city.
    Simulate(SimulateArgs),
    /// Train the feature model on rule-based scores.
    Train(TrainArgs),
    /// Compare the trained model with the rule-based score.
    Predict(PredictArgs),
    /// Write reports as CSV or JSON.
    Export(ExportArgs),
    /// Fill coordinates and air quality from external APIs.
    Enrich(EnrichArgs),
    #[command(subcommand)]
    Config(ConfigCommand),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// CSV or JSON file of cities; the built-in sample set when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Only this city.
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct CityArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    city: String,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct SimulateArgs {
    #[command(flatten)]
    target: CityArgs,
    /// Percent change of green space area and coverage.
    #[arg(long, allow_negative_numbers = true)]
    green_space_increase: Option<f64>,
    #[arg(long)]
    tree_plantation: Option<f64>,
    /// Percent cut in vehicles.
    #[arg(long)]
    traffic_reduction: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct TrainArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long, default_value = "data/model.json")]
    model: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct PredictArgs {
    #[command(flatten)]
    target: CityArgs,
    #[arg(long, default_value = "data/model.json")]
    model: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,
    /// Stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct EnrichArgs {
    #[command(flatten)]
    input: InputArgs,
    /// JSON file for the enriched records; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default configuration.
    Init {
        #[arg(long, default_value = "config/sustainability.toml")]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "data/cities.json")]
    store: PathBuf,
    /// Trained model to load at startup and to overwrite after training.
    #[arg(long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urban_sustain=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    if let Command::Config(ConfigCommand::Init { path, force }) = &cli.command {
        return init_config(path, *force);
    }

    let (config, config_path) = AnalyzerConfig::load(cli.config)
        .map_err(|err| format!("failed to load config: {}", err))?;
    if let Some(path) = config_path.filter(|path| path.exists()) {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    let engines = Engines::new(&config);

    match cli.command {
        Command::Analyze(args) => run_analyze(&engines, args),
        Command::Plan(args) => run_plan(&engines, args),
        Command::Simulate(args) => run_simulate(&engines, args),
        Command::Train(args) => run_train(&engines, args),
        Command::Predict(args) => run_predict(&engines, args),
        Command::Export(args) => run_export(&engines, args),
        Command::Enrich(args) => run_enrich(args).await,
        Command::Config(_) => Ok(()),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn run_analyze(engines: &Engines, args: AnalyzeArgs) -> Result<(), String> {
    let cities = match args.city.as_deref() {
        Some(name) => vec![find_city(&args.input, name)?],
        None => read_cities(&args.input)?,
    };
    let reports = build_reports(engines, &cities)?;

    if args.json {
        return print_json(&reports);
    }

    for report in &reports {
        let metrics = &report.metrics;
        println!(
            "{}: {} ({} / {})",
            report.city.name,
            format_float(metrics.sustainability_score, 2),
            metrics.category.label(),
            metrics.badge_level.label()
        );
        println!(
            "  Green space: {} m²/person ({}% of WHO standard)",
            format_float(metrics.green_space_per_capita, 2),
            format_float(metrics.who_standard_compliance, 1)
        );
        println!(
            "  Remediation: {} km² green space | {} parks | {} trees | {} t CO2/yr",
            format_float(metrics.required_green_space, 2),
            format_number(metrics.recommended_parks as f64),
            format_number(metrics.recommended_trees as f64),
            format_float(metrics.co2_reduction_potential, 1)
        );
        println!(
            "  Sustainability debt: {}",
            format_float(metrics.sustainability_debt.total_debt, 2)
        );

        if args.details {
            for (name, component) in metrics.score_explanation.components() {
                println!(
                    "  {}: {} (weight {}%, {})",
                    name,
                    format_float(component.score, 1),
                    format_float(component.weight, 0),
                    component.status
                );
            }
            let recommendations = &report.recommendations;
            print_list("Immediate actions", &recommendations.immediate_actions);
            print_list("Short term", &recommendations.short_term);
            print_list("Long term", &recommendations.long_term);
            for (zone, actions) in &recommendations.zone_specific {
                print_list(zone, actions);
            }
        }
    }
    Ok(())
}

fn run_plan(engines: &Engines, args: CityArgs) -> Result<(), String> {
    let city = find_city(&args.input, &args.city)?;
    let metrics = engines.analyzer.analyze(&city).map_err(|err| err.to_string())?;
    let plan = engines.planner.plan(&city, &metrics);

    if args.json {
        return print_json(&plan);
    }

    println!("{}: {}", plan.city_name, plan.overall_priority.label());
    for (category, severity) in plan.weaknesses.severities() {
        println!("  weakness {}: {}", category.label(), severity.label());
    }
    for (label, actions) in [
        ("Short term (0-6 months)", &plan.short_term),
        ("Mid term (6-24 months)", &plan.mid_term),
        ("Long term (2-5 years)", &plan.long_term),
    ] {
        println!("\n{}:", label);
        for action in actions {
            println!("- {} [{}]: {}", action.action, action.timeline, action.description);
        }
    }
    println!(
        "\nTarget score: {} (+{} potential)",
        format_float(plan.estimated_impact.target_score, 1),
        format_float(plan.estimated_impact.total_potential, 1)
    );
    println!(
        "Budget: {} total ({} per capita)",
        format_number(plan.budget_estimate.total),
        format_number(plan.budget_estimate.per_capita)
    );
    Ok(())
}

fn run_simulate(engines: &Engines, args: SimulateArgs) -> Result<(), String> {
    let city = find_city(&args.target.input, &args.target.city)?;

    let mut named = BTreeMap::new();
    if let Some(value) = args.green_space_increase {
        named.insert("green_space_increase".to_string(), value);
    }
    if let Some(value) = args.tree_plantation {
        named.insert("tree_plantation".to_string(), value);
    }
    if let Some(value) = args.traffic_reduction {
        named.insert("traffic_reduction".to_string(), value);
    }
    if named.is_empty() {
        return Err(
            "no scenario given: pass --green-space-increase, --tree-plantation or --traffic-reduction"
                .to_string(),
        );
    }

    let scenarios = ScenarioSet::from_named(&named).map_err(|err| err.to_string())?;
    let result = engines
        .simulation
        .simulate_set(&city, &scenarios)
        .map_err(|err| err.to_string())?;

    if args.target.json {
        return print_json(&result);
    }

    println!(
        "{}: {} -> {} ({:+.2})",
        city.name,
        format_float(result.original_metrics.sustainability_score, 2),
        format_float(result.new_metrics.sustainability_score, 2),
        result.deltas.sustainability_score_change
    );
    println!(
        "  AQI improvement: {} | green space per capita: {:+.2} m²",
        format_float(result.deltas.aqi_change, 1),
        result.deltas.green_space_per_capita_change
    );
    println!(
        "  Badge: {} -> {}",
        result.original_metrics.badge_level.label(),
        result.new_metrics.badge_level.label()
    );
    Ok(())
}

fn run_train(engines: &Engines, args: TrainArgs) -> Result<(), String> {
    let cities = read_cities(&args.input)?;
    let trained = engines
        .model
        .train_from_analyzer(&engines.analyzer, &cities)
        .map_err(|err| err.to_string())?;
    trained.save(&args.model).map_err(|err| err.to_string())?;

    println!(
        "Trained on {} cities, saved to {}",
        trained.training_samples(),
        args.model.display()
    );
    println!("Feature importance:");
    for feature in trained.feature_importance() {
        println!("  {}: {}", feature.name, format_float(feature.weight, 3));
    }
    Ok(())
}

fn run_predict(engines: &Engines, args: PredictArgs) -> Result<(), String> {
    let city = find_city(&args.target.input, &args.target.city)?;
    let handle = if args.model.exists() {
        ModelHandle::with_model(TrainedModel::load(&args.model).map_err(|err| err.to_string())?)
    } else {
        ModelHandle::new()
    };
    let comparison = compare(&handle, &engines.analyzer, &city).map_err(|err| err.to_string())?;

    if args.target.json {
        return print_json(&comparison);
    }

    println!(
        "{}: rule-based {}",
        city.name,
        format_float(comparison.rule_based_score, 2)
    );
    match (comparison.ml_prediction, comparison.difference) {
        (Some(prediction), Some(difference)) => println!(
            "  model {} (difference {})",
            format_float(prediction, 2),
            format_float(difference, 2)
        ),
        _ => println!(
            "  no trained model at {}: run `urban-sustain train` first",
            args.model.display()
        ),
    }
    Ok(())
}

fn run_export(engines: &Engines, args: ExportArgs) -> Result<(), String> {
    let cities = read_cities(&args.input)?;
    let reports = build_reports(engines, &cities)?;

    let writer: Box<dyn Write> = match args.output.as_ref() {
        Some(path) => {
            ensure_parent(path)?;
            Box::new(
                File::create(path)
                    .map_err(|err| format!("failed to create {}: {}", path.display(), err))?,
            )
        }
        None => Box::new(io::stdout()),
    };

    match args.format {
        ExportFormat::Csv => write_csv(writer, &reports).map_err(|err| err.to_string())?,
        ExportFormat::Json => write_json(writer, &reports).map_err(|err| err.to_string())?,
    }
    if let Some(path) = args.output {
        eprintln!("Exported {} cities to {}", reports.len(), path.display());
    }
    Ok(())
}

async fn run_enrich(args: EnrichArgs) -> Result<(), String> {
    let enricher = enrich::Enricher::from_env()?;
    if !enricher.is_configured() {
        return Err("GEOAPIFY_API_KEY is not set".to_string());
    }

    let cities = read_cities(&args.input)?;
    let mut enriched = Vec::with_capacity(cities.len());
    for city in &cities {
        enriched.push(enricher.enrich(city).await);
    }

    let payload = serde_json::to_string_pretty(&enriched)
        .map_err(|err| format!("failed to serialize cities: {}", err))?;
    match args.output {
        Some(path) => {
            ensure_parent(&path)?;
            std::fs::write(&path, payload)
                .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
        }
        None => println!("{}", payload),
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        ));
    }
    AnalyzerConfig::default()
        .write(path)
        .map_err(|err| err.to_string())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn read_cities(args: &InputArgs) -> Result<Vec<CityRecord>, String> {
    match args.input.as_ref() {
        Some(path) => load_cities(path).map_err(|err| format!("{}: {}", path.display(), err)),
        None => Ok(sample_cities()),
    }
}

fn find_city(args: &InputArgs, name: &str) -> Result<CityRecord, String> {
    read_cities(args)?
        .into_iter()
        .find(|city| city.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("city not found: {}", name))
}

fn build_reports(engines: &Engines, cities: &[CityRecord]) -> Result<Vec<CityReport>, String> {
    cities
        .iter()
        .map(|city| engines.report(city).map_err(|err| err.to_string()))
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", title);
    for item in items {
        println!("  - {}", item);
    }
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err)),
        _ => Ok(()),
    }
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
