//! The city aggregate.
//!
//! Owns the building collection and every piece of city-wide scalar state.
//! All derived metrics are pure recomputations over the current collection;
//! nothing here caches across cycles. Satisfaction and pollution can only be
//! written through their clamping setters.

use tracing::debug;

use crate::buildings::{Building, BuildingError, BuildingId, Workforce};
use crate::config::Tuning;
use crate::events::CycleModifiers;
use crate::types::{BuildingType, Resources};

pub struct City {
    name: String,
    budget: f64,
    population: u32,
    satisfaction: i32,
    pollution: f64,
    resources: Resources,
    buildings: Vec<Building>,
    next_id: u32,
    tuning: Tuning,
}

impl City {
    pub fn new(
        name: impl Into<String>,
        budget: f64,
        population: u32,
        resources: Resources,
        tuning: Tuning,
    ) -> Self {
        Self {
            name: name.into(),
            budget,
            population,
            satisfaction: 50,
            pollution: 0.0,
            resources,
            buildings: Vec::new(),
            next_id: 0,
            tuning,
        }
    }

    // ----- building collection -----

    /// Take ownership of a building, assign its id and pay its construction
    /// cost. The budget may go negative; callers wanting to refuse
    /// unaffordable construction must check before building.
    pub fn add_building(&mut self, mut building: Building) -> BuildingId {
        self.next_id += 1;
        let id = BuildingId(self.next_id);
        building.id = id;
        self.budget -= building.cost;
        debug!(
            name = %building.name,
            building_type = %building.building_type,
            cost = building.cost,
            "building constructed"
        );
        self.buildings.push(building);
        self.assign_jobs();
        id
    }

    /// Demolish by id, refunding the construction cost.
    pub fn remove_building(&mut self, id: BuildingId) -> bool {
        match self.buildings.iter().position(|b| b.id == id) {
            Some(index) => {
                let building = self.buildings.remove(index);
                self.budget += building.cost;
                self.assign_jobs();
                true
            }
            None => false,
        }
    }

    /// Demolish the building anchored at exactly (x, y).
    pub fn remove_building_at(&mut self, x: i32, y: i32) -> bool {
        match self
            .buildings
            .iter()
            .position(|b| b.position.x == x && b.position.y == y)
        {
            Some(index) => {
                let building = self.buildings.remove(index);
                self.budget += building.cost;
                self.assign_jobs();
                true
            }
            None => false,
        }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Footprint lookup for the presentation layer.
    pub fn building_at(&self, x: i32, y: i32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.covers(x, y))
    }

    /// Move residents into a residential building (clamped at capacity).
    pub fn move_in(&mut self, id: BuildingId, count: u32) -> bool {
        let tuning = self.tuning.clone();
        match self.buildings.iter_mut().find(|b| b.id == id) {
            Some(building) if building.is_residential() => {
                building.add_occupants(count, &tuning);
                true
            }
            _ => false,
        }
    }

    /// Move residents out of a residential building (clamped at zero).
    pub fn move_out(&mut self, id: BuildingId, count: u32) -> bool {
        let tuning = self.tuning.clone();
        match self.buildings.iter_mut().find(|b| b.id == id) {
            Some(building) if building.is_residential() => {
                building.remove_occupants(count, &tuning);
                true
            }
            _ => false,
        }
    }

    pub fn add_floor(&mut self, id: BuildingId) -> Result<(), BuildingError> {
        let tuning = self.tuning.clone();
        match self.buildings.iter_mut().find(|b| b.id == id) {
            Some(building) => building.add_floor(&tuning),
            None => Err(BuildingError::NotAnApartment),
        }
    }

    pub fn remove_floor(&mut self, id: BuildingId) -> Result<(), BuildingError> {
        let tuning = self.tuning.clone();
        match self.buildings.iter_mut().find(|b| b.id == id) {
            Some(building) => building.remove_floor(&tuning),
            None => Err(BuildingError::NotAnApartment),
        }
    }

    // ----- derived totals -----

    pub fn total_consumption(&self) -> Resources {
        self.buildings
            .iter()
            .fold(Resources::default(), |acc, b| acc + b.consumption)
    }

    /// Residents actually living in buildings; distinct from the city-wide
    /// headcount tracked in `population`.
    pub fn population_in_buildings(&self) -> u32 {
        self.buildings
            .iter()
            .filter_map(|b| b.housing())
            .map(|h| h.occupants)
            .sum()
    }

    pub fn housing_capacity(&self) -> u32 {
        self.buildings
            .iter()
            .filter_map(|b| b.housing())
            .map(|h| h.capacity)
            .sum()
    }

    /// Recompute city pollution from scratch and store it (clamped).
    pub fn recompute_pollution(&mut self, modifiers: &CycleModifiers) -> f64 {
        let tuning = self.tuning.clone();
        let mut total = 0.0;
        for building in &self.buildings {
            match building.building_type {
                BuildingType::PowerPlant => total += tuning.power_plant_pollution,
                BuildingType::Mall | BuildingType::Cinema | BuildingType::Bank => {
                    total += tuning.commerce_pollution
                }
                BuildingType::House | BuildingType::Apartment => {
                    total += tuning.housing_pollution;
                    if let Some(housing) = building.housing() {
                        let occupancy_ratio =
                            housing.occupants as f64 / (housing.capacity + 1) as f64;
                        total += occupancy_ratio * tuning.occupancy_pollution_weight;
                    }
                }
                _ => {}
            }
        }
        // Traffic and waste scale with headcount.
        total += (self.population as f64 / 100.0) * tuning.population_pollution_per_100;
        // The environment cleans itself a little every cycle.
        total *= tuning.pollution_decay;
        total *= modifiers.pollution;
        self.set_pollution(total);
        self.pollution
    }

    /// Recompute satisfaction from scratch and store it (clamped). A city
    /// with no population has nothing to be satisfied about.
    pub fn recompute_satisfaction(&mut self, modifiers: &CycleModifiers) -> i32 {
        if self.population == 0 {
            self.set_satisfaction(0);
            return 0;
        }
        let tuning = self.tuning.clone();
        let mut score = tuning.base_satisfaction;

        for building in &self.buildings {
            match building.building_type {
                BuildingType::Park => {
                    if !modifiers.block_park_effects {
                        score += tuning.park_satisfaction_bonus;
                    }
                }
                BuildingType::Cinema | BuildingType::Mall | BuildingType::Bank => {
                    score += tuning.commerce_satisfaction_bonus;
                }
                _ => {}
            }
        }

        let capacity = self.housing_capacity();
        if capacity > 0 {
            let housing_ratio = self.population_in_buildings() as f64 / capacity as f64;
            if housing_ratio < 0.5 {
                score += tuning.spacious_housing_bonus;
            } else if housing_ratio > 0.9 {
                score -= tuning.crowded_housing_penalty;
            }
        }

        score -= self.unemployment_rate() * tuning.unemployment_penalty_weight;

        let pollution_factor = self.pollution / 100.0;
        score -= pollution_factor * pollution_factor * tuning.pollution_penalty_weight;

        score *= modifiers.satisfaction;
        self.set_satisfaction(score.clamp(0.0, 100.0) as i32);
        self.satisfaction
    }

    // ----- employment -----

    /// Total job slots across service buildings.
    pub fn job_capacity(&self) -> u32 {
        self.buildings
            .iter()
            .filter_map(|b| b.workforce())
            .map(|w| w.needed)
            .sum()
    }

    /// Total filled slots across service buildings.
    pub fn employed_count(&self) -> u32 {
        self.buildings
            .iter()
            .filter_map(|b| b.workforce())
            .map(|w| w.filled)
            .sum()
    }

    /// Percentage of building residents without a job; 0 when nobody lives
    /// in the city.
    pub fn unemployment_rate(&self) -> f64 {
        let residents = self.population_in_buildings();
        if residents == 0 {
            return 0.0;
        }
        let employed = self.employed_count().min(residents);
        (residents - employed) as f64 / residents as f64 * 100.0
    }

    /// Distribute building residents across job slots. With enough workers
    /// every employer is fully staffed; otherwise each receives a
    /// proportional floor share and the remainder goes out one slot at a
    /// time in collection order.
    pub fn assign_jobs(&mut self) {
        let available_workers = self.population_in_buildings();
        let total_jobs = self.job_capacity();

        let mut employers: Vec<&mut Workforce> = self
            .buildings
            .iter_mut()
            .filter_map(|b| b.workforce_mut())
            .collect();
        if employers.is_empty() {
            return;
        }
        if available_workers == 0 {
            for jobs in employers {
                jobs.filled = 0;
            }
            return;
        }
        if available_workers >= total_jobs {
            for jobs in employers {
                jobs.filled = jobs.needed;
            }
            return;
        }

        let mut assigned = 0u32;
        for jobs in employers.iter_mut() {
            let proportion = jobs.needed as f64 / total_jobs as f64;
            let allocated =
                ((available_workers as f64 * proportion).floor() as u32).min(jobs.needed);
            jobs.filled = allocated;
            assigned += allocated;
        }

        let mut remaining = available_workers - assigned;
        for jobs in employers {
            if remaining == 0 {
                break;
            }
            if jobs.filled < jobs.needed {
                jobs.filled += 1;
                remaining -= 1;
            }
        }
    }

    // ----- economy -----

    /// Realized commercial profit at the current pollution level.
    pub fn profit(&self) -> f64 {
        self.buildings
            .iter()
            .filter_map(|b| b.commerce())
            .map(|c| c.realized_profit(self.pollution, &self.tuning))
            .sum()
    }

    /// Bank this cycle's commercial profit, scaled by the active event's
    /// income multiplier. Returns the amount collected.
    pub fn collect_profit(&mut self, modifiers: &CycleModifiers) -> f64 {
        if modifiers.block_commercial_income {
            return 0.0;
        }
        let collected = self.profit() * modifiers.budget;
        self.budget += collected;
        collected
    }

    /// Subtract every building's consumption from the resource pool and add
    /// back infrastructure production. Runs once per cycle evaluation.
    pub fn apply_resource_impacts(&mut self, modifiers: &CycleModifiers) {
        let mut pool = self.resources;
        for building in &self.buildings {
            pool -= building
                .consumption
                .scaled(modifiers.water_consumption, modifiers.electricity_consumption);
            if let Some(production) = building.production() {
                pool += production;
            }
        }
        self.resources = pool;
    }

    // ----- population dynamics -----

    /// Advance the city-wide headcount by one cycle: clamp to housing
    /// capacity, compose a bounded growth rate, add job-driven migration,
    /// enforce the exodus floor under very low satisfaction, then
    /// redistribute residents so building occupancy matches the new total.
    pub fn update_population(&mut self) {
        let tuning = self.tuning.clone();
        let capacity = self.housing_capacity() as i64;
        let mut pop = self.population as i64;

        if pop > capacity {
            self.set_population(capacity as u32);
            pop = capacity;
            let mut to_evict = self.population_in_buildings() as i64 - capacity;
            for building in &mut self.buildings {
                if to_evict <= 0 {
                    break;
                }
                if let Some(housing) = building.housing() {
                    let occupants = housing.occupants as i64;
                    if occupants > 0 {
                        let removed = occupants.min(to_evict);
                        building.remove_occupants(removed as u32, &tuning);
                        to_evict -= removed;
                    }
                }
            }
        }
        if capacity == 0 {
            self.set_population(0);
            return;
        }

        let satisfaction_effect = (self.satisfaction as f64 - 50.0) / 50.0;
        let pollution_ratio = self.pollution / 100.0;
        let unemployment_ratio = self.unemployment_rate() / 100.0;
        let density = pop as f64 / capacity as f64;
        let overcrowding = (density - 1.0).max(0.0);

        let growth_rate = (tuning.base_growth_rate
            + satisfaction_effect * tuning.satisfaction_growth_weight
            - unemployment_ratio * tuning.unemployment_growth_weight
            - pollution_ratio * tuning.pollution_growth_weight
            - overcrowding * tuning.overcrowding_growth_weight)
            .clamp(-tuning.growth_rate_bound, tuning.growth_rate_bound);

        // Open jobs pull newcomers in as long as there is somewhere to live.
        let vacancies = self.job_capacity().saturating_sub(self.employed_count()) as i64;
        let housing_space = capacity - pop;
        let migrants = if vacancies > 0 && housing_space > 0 {
            (vacancies.min(housing_space) as f64 * tuning.migration_rate).round() as i64
        } else {
            0
        };

        let mut delta = (pop as f64 * growth_rate).round() as i64 + migrants;

        // A miserable city empties out no matter what the growth terms say.
        if self.satisfaction < tuning.exodus_threshold {
            let exodus_fraction = (tuning.exodus_threshold - self.satisfaction) as f64 / 100.0;
            let min_decrease = (pop as f64 * exodus_fraction).round() as i64;
            if delta > -min_decrease {
                delta = -min_decrease;
            }
        }

        let new_population = (pop + delta).clamp(0, capacity);

        let mut difference = new_population - self.population_in_buildings() as i64;
        if difference > 0 {
            for building in &mut self.buildings {
                if difference == 0 {
                    break;
                }
                if let Some(housing) = building.housing() {
                    let spaces = housing.vacancies() as i64;
                    if spaces > 0 {
                        let moved = spaces.min(difference);
                        building.add_occupants(moved as u32, &tuning);
                        difference -= moved;
                    }
                }
            }
        } else if difference < 0 {
            let mut to_remove = -difference;
            for building in &mut self.buildings {
                if to_remove == 0 {
                    break;
                }
                if let Some(housing) = building.housing() {
                    let occupants = housing.occupants as i64;
                    if occupants > 0 {
                        let moved = occupants.min(to_remove);
                        building.remove_occupants(moved as u32, &tuning);
                        to_remove -= moved;
                    }
                }
            }
        }

        self.set_population(new_population as u32);
        if new_population == 0 {
            self.set_satisfaction(0);
        }
    }

    // ----- scalar state -----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn satisfaction(&self) -> i32 {
        self.satisfaction
    }

    pub fn pollution(&self) -> f64 {
        self.pollution
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn set_budget(&mut self, budget: f64) {
        self.budget = budget;
    }

    pub fn set_population(&mut self, population: u32) {
        self.population = population;
    }

    /// The only write path for satisfaction; always clamps to [0, 100].
    pub fn set_satisfaction(&mut self, satisfaction: i32) {
        self.satisfaction = satisfaction.clamp(0, 100);
    }

    /// The only write path for pollution; always clamps to [0, 100].
    pub fn set_pollution(&mut self, pollution: f64) {
        self.pollution = pollution.clamp(0.0, 100.0);
    }

    pub fn set_resources(&mut self, resources: Resources) {
        self.resources = resources;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::BuildingFactory;
    use crate::names::NameCatalog;
    use crate::types::Position;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn factory() -> BuildingFactory {
        BuildingFactory::new(
            Tuning::default(),
            NameCatalog::defaults(),
            ChaCha8Rng::seed_from_u64(21),
        )
    }

    fn empty_city(budget: f64, population: u32) -> City {
        City::new(
            "Testville",
            budget,
            population,
            Resources::default(),
            Tuning::default(),
        )
    }

    #[test]
    fn setters_clamp() {
        let mut city = empty_city(0.0, 0);
        city.set_satisfaction(250);
        assert_eq!(city.satisfaction(), 100);
        city.set_satisfaction(-3);
        assert_eq!(city.satisfaction(), 0);
        city.set_pollution(180.0);
        assert_eq!(city.pollution(), 100.0);
        city.set_pollution(-4.0);
        assert_eq!(city.pollution(), 0.0);
    }

    #[test]
    fn construction_charges_and_removal_refunds() {
        let mut city = empty_city(1000.0, 0);
        let mut factory = factory();
        let id = city.add_building(factory.house(Position::new(0, 0)));
        assert_eq!(city.budget(), 970.0);
        assert!(city.remove_building(id));
        assert_eq!(city.budget(), 1000.0);
        assert!(city.buildings().is_empty());
    }

    #[test]
    fn budget_may_go_negative() {
        let mut city = empty_city(100.0, 0);
        let mut factory = factory();
        city.add_building(factory.mall(Position::new(0, 0)));
        assert_eq!(city.budget(), -1900.0);
    }

    #[test]
    fn footprint_lookup() {
        let mut city = empty_city(5000.0, 0);
        let mut factory = factory();
        let id = city.add_building(factory.mall(Position::new(4, 4)));
        assert_eq!(city.building_at(6, 6).map(|b| b.id), Some(id));
        assert!(city.building_at(9, 9).is_none());
    }

    #[test]
    fn remove_building_at_matches_anchor_only() {
        let mut city = empty_city(5000.0, 0);
        let mut factory = factory();
        city.add_building(factory.mall(Position::new(4, 4)));
        assert!(!city.remove_building_at(5, 5));
        assert!(city.remove_building_at(4, 4));
        assert!(city.buildings().is_empty());
    }
}
