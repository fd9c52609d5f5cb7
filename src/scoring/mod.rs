pub mod analyzer;
pub mod components;
pub mod debt;
pub mod metrics;
pub mod remediation;

pub use analyzer::CityAnalyzer;
pub use debt::DebtCalculator;
pub use metrics::{
    BadgeLevel, Category, ComponentScore, ComponentValue, ScoreExplanation, SustainabilityDebt,
    SustainabilityMetrics,
};
pub use remediation::{required_green_space, Remediation, RemediationSizer};
