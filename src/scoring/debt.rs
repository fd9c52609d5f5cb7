use crate::city::CityRecord;
use crate::config::{ComponentWeights, StandardsConfig};
use crate::round_to;
use crate::scoring::SustainabilityDebt;

#[derive(Debug, Clone)]
pub struct DebtCalculator {
    weights: ComponentWeights,
    standards: StandardsConfig,
}

impl DebtCalculator {
    pub fn new(weights: ComponentWeights, standards: StandardsConfig) -> Self {
        Self { weights, standards }
    }

    /// Sub-debts are rounded before they enter the weighted total.
    pub fn calculate(
        &self,
        city: &CityRecord,
        green_per_capita: f64,
        traffic_multiplier: f64,
    ) -> SustainabilityDebt {
        let standards = &self.standards;

        let green_deficit = (standards.who_green_standard - green_per_capita).max(0.0);
        let green_space_debt = round_to(green_deficit * city.population as f64 / 1_000_000.0, 2);

        let aqi_excess = (city.aqi - standards.safe_aqi_threshold).max(0.0);
        let air_quality_debt = if standards.safe_aqi_threshold > 0.0 {
            round_to(aqi_excess / standards.safe_aqi_threshold * 100.0, 1)
        } else {
            0.0
        };

        let density_pressure = city.population_density / standards.max_acceptable_density;
        let traffic_debt = round_to(
            ((traffic_multiplier - 1.0) * 50.0 + (density_pressure - 1.0) * 30.0).max(0.0),
            1,
        );

        let land_use_debt = round_to((city.built_up_percentage - standards.optimal_built_up).max(0.0), 1);
        let transport_debt = round_to(
            (standards.optimal_transport_usage - city.public_transport_usage).max(0.0),
            1,
        );

        let total_debt = round_to(
            green_space_debt * self.weights.green_space
                + air_quality_debt * self.weights.air_quality
                + traffic_debt * self.weights.traffic
                + land_use_debt * self.weights.land_use
                + transport_debt * self.weights.transport,
            2,
        );

        SustainabilityDebt {
            green_space_debt,
            air_quality_debt,
            traffic_debt,
            land_use_debt,
            transport_debt,
            total_debt,
        }
    }
}
