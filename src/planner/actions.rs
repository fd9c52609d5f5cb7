use serde::{Deserialize, Serialize};

use crate::city::CityRecord;
use crate::planner::weakness::{Severity, WeaknessProfile};
use crate::scoring::SustainabilityMetrics;
use crate::{format_float, format_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Transformational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    ShortTerm,
    MidTerm,
    LongTerm,
}

impl Timeframe {
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::ShortTerm => "0-6 months",
            Timeframe::MidTerm => "6-24 months",
            Timeframe::LongTerm => "2-5 years",
        }
    }
}

/// Numeric target of an action, derived from the city's own figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub action: String,
    pub description: String,
    pub timeline: String,
    pub cost: CostLevel,
    pub impact: ImpactLevel,
    pub specific_to: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

impl PlannedAction {
    fn new(
        action: &str,
        description: String,
        timeline: &str,
        cost: CostLevel,
        impact: ImpactLevel,
        specific_to: String,
        steps: Vec<String>,
    ) -> Self {
        Self {
            action: action.to_string(),
            description,
            timeline: timeline.to_string(),
            cost,
            impact,
            specific_to,
            steps,
            quantity: None,
        }
    }

    fn with_quantity(mut self, amount: f64, unit: &str) -> Self {
        self.quantity = Some(Quantity {
            amount,
            unit: unit.to_string(),
        });
        self
    }
}

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Trees planted by the rapid greening initiative: one per thousand inhabitants.
pub fn greening_tree_count(population: u64) -> u64 {
    (population as f64 * 0.001).floor() as u64
}

pub fn rooftop_garden_count(population: u64) -> u64 {
    (population as f64 * 0.0001).floor() as u64
}

pub fn urban_forest_count(total_deficit_sqkm: f64) -> u64 {
    (total_deficit_sqkm * 2.0).floor() as u64
}

pub fn bus_corridor_km(area: f64) -> u64 {
    (area * 0.5).floor() as u64
}

pub fn green_belt_sqkm(area: f64) -> u64 {
    (area * 0.1).floor() as u64
}

/// Quick wins for the first six months.
pub fn short_term_actions(city: &CityRecord, weaknesses: &WeaknessProfile) -> Vec<PlannedAction> {
    let mut actions = Vec::new();
    let name = &city.name;

    if let Some(air) = &weaknesses.air_quality {
        if air.severity == Severity::Critical {
            actions.push(PlannedAction::new(
                "Emergency Air Quality Response",
                format!("Implement odd-even vehicle scheme in {}", name),
                "1-2 months",
                CostLevel::Low,
                ImpactLevel::High,
                format!("{} has AQI of {}", name, format_float(city.aqi, 0)),
                steps(&[
                    "Deploy air quality monitoring stations",
                    "Restrict heavy vehicle entry during peak hours",
                    "Increase public transport frequency by 30%",
                    "Launch awareness campaigns",
                ]),
            ));
        }

        actions.push(PlannedAction::new(
            "Anti-Dust Campaign",
            format!("Control construction dust in {}", name),
            "2-3 months",
            CostLevel::Low,
            ImpactLevel::Medium,
            format!("PM10 levels at {} in {}", format_float(city.pm10, 1), name),
            steps(&[
                "Mandate dust covers at construction sites",
                "Water spraying on major roads",
                "Fine violators",
            ]),
        ));
    }

    if let Some(green) = &weaknesses.green_space {
        let trees = greening_tree_count(city.population);
        let plots = (city.existing_parks as f64 * 0.5).floor() as u64;
        actions.push(
            PlannedAction::new(
                "Rapid Greening Initiative",
                format!("Plant {} trees in {}", format_number(trees as f64), name),
                "3-6 months",
                CostLevel::Medium,
                ImpactLevel::High,
                format!(
                    "{} needs {} sq km more green space",
                    name,
                    format_float(green.total_deficit_sqkm, 1)
                ),
                vec![
                    format!("Identify {} vacant plots", plots),
                    "Community tree plantation drives".to_string(),
                    "School/college campus greening".to_string(),
                    "Roadside avenue plantation".to_string(),
                ],
            )
            .with_quantity(trees as f64, "trees"),
        );
    }

    if weaknesses.traffic.is_some() {
        actions.push(PlannedAction::new(
            "Smart Traffic Management",
            format!("Deploy adaptive traffic signals in {}", name),
            "4-6 months",
            CostLevel::Medium,
            ImpactLevel::Medium,
            format!(
                "{} has {} vehicles",
                name,
                format_number(city.vehicle_count as f64)
            ),
            steps(&[
                "Install smart traffic lights at 20 junctions",
                "Real-time traffic monitoring",
                "Optimize signal timing from live counts",
            ]),
        ));
    }

    actions
}

/// Structural improvements between six months and two years.
pub fn mid_term_actions(city: &CityRecord, weaknesses: &WeaknessProfile) -> Vec<PlannedAction> {
    let mut actions = Vec::new();
    let name = &city.name;

    if let Some(green) = &weaknesses.green_space {
        let deficit = green.total_deficit_sqkm;
        let forests = urban_forest_count(deficit);
        actions.push(
            PlannedAction::new(
                "Urban Forest Development",
                format!("Create {} new urban forests in {}", forests, name),
                "12-18 months",
                CostLevel::High,
                ImpactLevel::VeryHigh,
                format!("{} needs {} sq km green space", name, format_float(deficit, 1)),
                vec![
                    format!("Acquire {} sq km land", format_float(deficit, 1)),
                    "Design mini-forests using Miyawaki method".to_string(),
                    "Plant native species".to_string(),
                    "Create walking trails and amenities".to_string(),
                    "Involve local communities".to_string(),
                ],
            )
            .with_quantity(forests as f64, "urban forests"),
        );

        let rooftops = rooftop_garden_count(city.population);
        actions.push(
            PlannedAction::new(
                "Rooftop Garden Program",
                format!("Convert {} rooftops to gardens", format_number(rooftops as f64)),
                "12-24 months",
                CostLevel::Medium,
                ImpactLevel::High,
                format!(
                    "{} has {}% built-up area",
                    name,
                    format_float(city.built_up_percentage, 1)
                ),
                steps(&[
                    "Subsidize rooftop garden kits",
                    "Train building owners",
                    "Tax incentives for green roofs",
                    "Showcase model projects",
                ]),
            )
            .with_quantity(rooftops as f64, "rooftops"),
        );
    }

    if weaknesses.air_quality.is_some() {
        actions.push(PlannedAction::new(
            "Clean Energy Transition",
            format!("Convert {} public transport to electric", name),
            "18-24 months",
            CostLevel::VeryHigh,
            ImpactLevel::VeryHigh,
            format!("{} AQI is {}", name, format_float(city.aqi, 0)),
            steps(&[
                "Procure 100 electric buses",
                "Install charging infrastructure",
                "Phase out old diesel buses",
                "Promote electric auto-rickshaws",
            ]),
        ));
    }

    if weaknesses.traffic.is_some() {
        let corridor_km = bus_corridor_km(city.area);
        actions.push(
            PlannedAction::new(
                "Dedicated Bus Corridors",
                format!("Build {} km bus rapid transit in {}", corridor_km, name),
                "18-24 months",
                CostLevel::VeryHigh,
                ImpactLevel::High,
                format!(
                    "{} public transport usage only {}%",
                    name,
                    format_float(city.public_transport_usage, 1)
                ),
                steps(&[
                    "Identify key corridors",
                    "Design dedicated bus lanes",
                    "Construct stations",
                    "Integrate with existing transport",
                ]),
            )
            .with_quantity(corridor_km as f64, "km"),
        );
    }

    actions
}

/// Transformational programmes over two to five years.
pub fn long_term_actions(
    city: &CityRecord,
    metrics: &SustainabilityMetrics,
    weaknesses: &WeaknessProfile,
) -> Vec<PlannedAction> {
    let mut actions = Vec::new();
    let name = &city.name;

    actions.push(PlannedAction::new(
        "Smart Sustainable City Vision 2030",
        format!("Transform {} into a model sustainable city", name),
        "3-5 years",
        CostLevel::VeryHigh,
        ImpactLevel::Transformational,
        format!(
            "{} current score: {}",
            name,
            format_float(metrics.sustainability_score, 1)
        ),
        steps(&[
            "Develop comprehensive master plan",
            "Create green corridors connecting all parks",
            "Build circular economy infrastructure",
            "Achieve 50% renewable energy",
            "Zero-waste management system",
            "Smart city IoT integration",
        ]),
    ));

    if weaknesses.green_space.is_some() {
        let belt = green_belt_sqkm(city.area);
        actions.push(
            PlannedAction::new(
                "Green Belt Development",
                format!("Create {} sq km green belt around {}", belt, name),
                "3-4 years",
                CostLevel::VeryHigh,
                ImpactLevel::VeryHigh,
                format!("{} needs major green infrastructure", name),
                steps(&[
                    "Acquire peripheral land",
                    "Plant 1 million trees",
                    "Create biodiversity zones",
                    "Build eco-tourism facilities",
                    "Establish research centers",
                ]),
            )
            .with_quantity(belt as f64, "sq km"),
        );
    }

    if weaknesses.air_quality.is_some() {
        actions.push(PlannedAction::new(
            "Zero Emission Zone",
            format!("Make {} city center emission-free", name),
            "4-5 years",
            CostLevel::VeryHigh,
            ImpactLevel::Transformational,
            format!("{} needs drastic air quality improvement", name),
            steps(&[
                "Ban all fossil fuel vehicles in core area",
                "Deploy electric shuttle services",
                "Create pedestrian-only zones",
                "Install air purification towers",
                "Achieve WHO air quality standards",
            ]),
        ));
    }

    actions.push(PlannedAction::new(
        "Climate Resilient Infrastructure",
        format!("Future-proof {} for climate change", name),
        "3-5 years",
        CostLevel::VeryHigh,
        ImpactLevel::VeryHigh,
        format!(
            "{} population {} needs protection",
            name,
            format_number(city.population as f64)
        ),
        steps(&[
            "Build flood management systems",
            "Create urban cooling infrastructure",
            "Develop water harvesting network",
            "Establish climate monitoring centers",
            "Train disaster response teams",
        ]),
    ));

    actions
}
