use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Poor,
    Moderate,
    Sustainable,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Poor => "Poor",
            Category::Moderate => "Moderate",
            Category::Sustainable => "Sustainable",
        }
    }
}

/// Finer rating nested inside a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    Critical,
}

impl BadgeLevel {
    pub fn label(self) -> &'static str {
        match self {
            BadgeLevel::Excellent => "Excellent",
            BadgeLevel::Good => "Good",
            BadgeLevel::Moderate => "Moderate",
            BadgeLevel::Poor => "Poor",
            BadgeLevel::Critical => "Critical",
        }
    }

    pub fn category(self) -> Category {
        match self {
            BadgeLevel::Excellent | BadgeLevel::Good => Category::Sustainable,
            BadgeLevel::Moderate => Category::Moderate,
            BadgeLevel::Poor | BadgeLevel::Critical => Category::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentValue {
    Number(f64),
    Label(String),
}

impl ComponentValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ComponentValue::Number(value) => Some(*value),
            ComponentValue::Label(_) => None,
        }
    }
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// 0-100, one decimal.
    pub score: f64,
    /// Share of the aggregate, in percent.
    pub weight: f64,
    pub value: ComponentValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_factor: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub green_space: ComponentScore,
    pub air_quality: ComponentScore,
    pub traffic: ComponentScore,
    pub land_use: ComponentScore,
    pub transport: ComponentScore,
}

impl ScoreExplanation {
    pub fn components(&self) -> [(&'static str, &ComponentScore); 5] {
        [
            ("green_space", &self.green_space),
            ("air_quality", &self.air_quality),
            ("traffic", &self.traffic),
            ("land_use", &self.land_use),
            ("transport", &self.transport),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityDebt {
    /// km² of missing green space.
    pub green_space_debt: f64,
    /// Percent over the safe AQI.
    pub air_quality_debt: f64,
    pub traffic_debt: f64,
    /// Built-up percentage points over the optimum.
    pub land_use_debt: f64,
    /// Transport usage percentage points under the optimum.
    pub transport_debt: f64,
    pub total_debt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityMetrics {
    /// m² per person.
    pub green_space_per_capita: f64,
    pub who_standard_compliance: f64,
    pub sustainability_score: f64,
    pub category: Category,
    pub badge_level: BadgeLevel,
    /// km²
    pub required_green_space: f64,
    pub recommended_parks: u64,
    pub recommended_trees: u64,
    /// tons of CO2 per year.
    pub co2_reduction_potential: f64,
    pub sustainability_debt: SustainabilityDebt,
    pub score_explanation: ScoreExplanation,
}
