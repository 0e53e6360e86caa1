//! Tunable constants for the simulation.
//!
//! Everything that shapes the balance of the game lives here as plain data,
//! passed into the city and the building factory at construction. Scenario
//! files may override individual fields; anything omitted keeps its default.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Residential buildings. Consumption is recomputed from occupancy with
    // these per-person rates whenever occupants move in or out.
    pub water_per_person: f64,
    pub electricity_per_person: f64,
    pub satisfaction_per_person: f64,
    pub pollution_per_person: f64,
    pub house_capacity: u32,
    pub apartment_max_floors: u32,
    pub apartment_capacity_per_floor: u32,
    pub apartment_cost_per_floor: f64,
    pub apartment_water_per_floor: f64,
    pub apartment_electricity_per_floor: f64,
    pub apartment_pollution_per_floor: f64,
    pub apartment_satisfaction_per_floor: i32,

    // Commercial buildings.
    pub profit_per_employee: f64,
    pub satisfaction_bonus: f64,
    pub pollution_penalty: f64,
    /// Output factor of an understaffed commercial building.
    pub employee_efficiency: f64,
    pub cinema_employees: u32,
    pub mall_employees: u32,
    pub bank_employees: u32,

    // City-wide pollution: per-building contributions by type, an
    // occupancy-weighted term for housing, a population term per 100
    // citizens, and a self-cleaning decay applied to the total.
    pub power_plant_pollution: f64,
    pub commerce_pollution: f64,
    pub housing_pollution: f64,
    pub occupancy_pollution_weight: f64,
    pub population_pollution_per_100: f64,
    pub pollution_decay: f64,

    // City-wide satisfaction.
    pub base_satisfaction: f64,
    pub park_satisfaction_bonus: f64,
    pub commerce_satisfaction_bonus: f64,
    pub spacious_housing_bonus: f64,
    pub crowded_housing_penalty: f64,
    pub unemployment_penalty_weight: f64,
    pub pollution_penalty_weight: f64,

    // Population growth, composed per cycle and clamped to
    // [-growth_rate_bound, +growth_rate_bound].
    pub base_growth_rate: f64,
    pub satisfaction_growth_weight: f64,
    pub unemployment_growth_weight: f64,
    pub pollution_growth_weight: f64,
    pub overcrowding_growth_weight: f64,
    pub growth_rate_bound: f64,
    /// Fraction of min(job vacancies, housing space) arriving per cycle.
    pub migration_rate: f64,
    /// Below this satisfaction a minimum population decline is enforced.
    pub exodus_threshold: i32,

    // Events.
    /// Global per-cycle gate before any individual event is even rolled.
    pub base_event_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            water_per_person: 0.5,
            electricity_per_person: 0.3,
            satisfaction_per_person: 0.1,
            pollution_per_person: 0.05,
            house_capacity: 6,
            apartment_max_floors: 4,
            apartment_capacity_per_floor: 2,
            apartment_cost_per_floor: 15.0,
            apartment_water_per_floor: 10.0,
            apartment_electricity_per_floor: 10.0,
            apartment_pollution_per_floor: 2.0,
            apartment_satisfaction_per_floor: 1,

            profit_per_employee: 2.0,
            satisfaction_bonus: 1.0,
            pollution_penalty: 0.5,
            employee_efficiency: 0.8,
            cinema_employees: 5,
            mall_employees: 50,
            bank_employees: 10,

            power_plant_pollution: 15.0,
            commerce_pollution: 5.0,
            housing_pollution: 2.0,
            occupancy_pollution_weight: 3.0,
            population_pollution_per_100: 0.5,
            pollution_decay: 0.95,

            base_satisfaction: 50.0,
            park_satisfaction_bonus: 8.0,
            commerce_satisfaction_bonus: 5.0,
            spacious_housing_bonus: 5.0,
            crowded_housing_penalty: 15.0,
            unemployment_penalty_weight: 0.2,
            pollution_penalty_weight: 50.0,

            base_growth_rate: 0.005,
            satisfaction_growth_weight: 0.02,
            unemployment_growth_weight: 0.02,
            pollution_growth_weight: 0.03,
            overcrowding_growth_weight: 0.05,
            growth_rate_bound: 0.2,
            migration_rate: 0.05,
            exodus_threshold: 25,

            base_event_chance: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let tuning: Tuning = serde_yaml::from_str("base_event_chance: 0.5").unwrap();
        assert_eq!(tuning.base_event_chance, 0.5);
        assert_eq!(tuning.house_capacity, 6);
        assert_eq!(tuning.profit_per_employee, 2.0);
    }
}
