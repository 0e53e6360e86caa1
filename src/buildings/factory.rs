//! Blueprints for the concrete building types.
//!
//! The factory owns the name catalog and a seeded generator for name draws;
//! ids stay unassigned until the city takes ownership of the building.

use rand_chacha::ChaCha8Rng;

use crate::config::Tuning;
use crate::names::NameCatalog;
use crate::types::{BuildingType, Position, Resources, Surface};

use super::{
    Building, BuildingError, BuildingId, BuildingKind, Commerce, Grounds, Housing, Utility,
    Workforce,
};

pub struct BuildingFactory {
    tuning: Tuning,
    names: NameCatalog,
    rng: ChaCha8Rng,
}

impl BuildingFactory {
    pub fn new(tuning: Tuning, names: NameCatalog, rng: ChaCha8Rng) -> Self {
        Self { tuning, names, rng }
    }

    /// Dispatch on the building type. `floors` only matters for apartments.
    pub fn build(
        &mut self,
        building_type: BuildingType,
        position: Position,
        floors: u32,
    ) -> Result<Building, BuildingError> {
        Ok(match building_type {
            BuildingType::House => self.house(position),
            BuildingType::Apartment => self.apartment(position, floors)?,
            BuildingType::Cinema => self.cinema(position),
            BuildingType::Mall => self.mall(position),
            BuildingType::Bank => self.bank(position),
            BuildingType::PowerPlant => self.power_plant(position),
            BuildingType::WaterTreatmentPlant => self.water_treatment_plant(position),
            BuildingType::UtilityPlant => self.utility_plant(position),
            BuildingType::Park => self.park(position),
        })
    }

    pub fn house(&mut self, position: Position) -> Building {
        let capacity = self.tuning.house_capacity;
        let per_person = capacity as f64;
        Building {
            id: BuildingId::default(),
            name: self.names.random_name(BuildingType::House, &mut self.rng),
            building_type: BuildingType::House,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: 30.0,
            consumption: Resources::new(
                per_person * self.tuning.water_per_person,
                per_person * self.tuning.electricity_per_person,
            ),
            pollution: per_person * self.tuning.pollution_per_person,
            satisfaction_effect: (self.tuning.satisfaction_per_person * per_person * 10.0) as i32,
            kind: BuildingKind::Residential(Housing {
                capacity,
                occupants: 0,
                floors: None,
            }),
        }
    }

    pub fn apartment(
        &mut self,
        position: Position,
        floors: u32,
    ) -> Result<Building, BuildingError> {
        if floors == 0 {
            return Err(BuildingError::NoFloors);
        }
        if floors > self.tuning.apartment_max_floors {
            return Err(BuildingError::FloorLimit {
                max: self.tuning.apartment_max_floors,
            });
        }
        let f = floors as f64;
        Ok(Building {
            id: BuildingId::default(),
            name: self
                .names
                .random_name(BuildingType::Apartment, &mut self.rng),
            building_type: BuildingType::Apartment,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: self.tuning.apartment_cost_per_floor * f,
            consumption: Resources::new(
                self.tuning.apartment_water_per_floor * f,
                self.tuning.apartment_electricity_per_floor * f,
            ),
            pollution: self.tuning.apartment_pollution_per_floor * f,
            satisfaction_effect: self.tuning.apartment_satisfaction_per_floor * floors as i32,
            kind: BuildingKind::Residential(Housing {
                capacity: self.tuning.apartment_capacity_per_floor * floors,
                occupants: 0,
                floors: Some(floors),
            }),
        })
    }

    pub fn cinema(&mut self, position: Position) -> Building {
        let jobs = self.tuning.cinema_employees;
        let base_profit = self.tuning.profit_per_employee * jobs as f64;
        Building {
            id: BuildingId::default(),
            name: self.names.random_name(BuildingType::Cinema, &mut self.rng),
            building_type: BuildingType::Cinema,
            position,
            surface: Surface::new(1.0, 2.0),
            cost: 500.0,
            consumption: Resources::new(10.0, 30.0),
            pollution: 2.5 * (1.0 + self.tuning.pollution_penalty),
            satisfaction_effect: (100.0 * self.tuning.satisfaction_bonus) as i32,
            kind: BuildingKind::Commercial(Commerce {
                jobs: Workforce::new(jobs),
                base_profit,
            }),
        }
    }

    pub fn mall(&mut self, position: Position) -> Building {
        let jobs = self.tuning.mall_employees;
        let base_profit =
            self.tuning.profit_per_employee * jobs as f64 * self.tuning.employee_efficiency;
        Building {
            id: BuildingId::default(),
            name: self.names.random_name(BuildingType::Mall, &mut self.rng),
            building_type: BuildingType::Mall,
            position,
            surface: Surface::new(3.0, 3.0),
            cost: 2000.0,
            consumption: Resources::new(400.0, 600.0),
            pollution: 8.0 * (1.0 + self.tuning.pollution_penalty),
            satisfaction_effect: (100.0 * self.tuning.satisfaction_bonus) as i32,
            kind: BuildingKind::Commercial(Commerce {
                jobs: Workforce::new(jobs),
                base_profit,
            }),
        }
    }

    pub fn bank(&mut self, position: Position) -> Building {
        let jobs = self.tuning.bank_employees;
        let base_profit = self.tuning.profit_per_employee * jobs as f64 * 2.5;
        Building {
            id: BuildingId::default(),
            name: self.names.random_name(BuildingType::Bank, &mut self.rng),
            building_type: BuildingType::Bank,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: 2000.0,
            consumption: Resources::new(10.0, 30.0),
            pollution: 2.0 * (1.0 + self.tuning.pollution_penalty),
            satisfaction_effect: -20,
            kind: BuildingKind::Commercial(Commerce {
                jobs: Workforce::new(jobs),
                base_profit,
            }),
        }
    }

    pub fn power_plant(&mut self, position: Position) -> Building {
        Building {
            id: BuildingId::default(),
            name: self
                .names
                .random_name(BuildingType::PowerPlant, &mut self.rng),
            building_type: BuildingType::PowerPlant,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: 20.0,
            consumption: Resources::new(3.0, 0.0),
            pollution: 20.0,
            satisfaction_effect: -2,
            kind: BuildingKind::Infrastructure(Utility {
                jobs: Workforce::new(40),
                production: Resources::new(0.0, 200.0),
            }),
        }
    }

    pub fn water_treatment_plant(&mut self, position: Position) -> Building {
        Building {
            id: BuildingId::default(),
            name: self
                .names
                .random_name(BuildingType::WaterTreatmentPlant, &mut self.rng),
            building_type: BuildingType::WaterTreatmentPlant,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: 20.0,
            consumption: Resources::new(0.0, 7.0),
            pollution: 15.0,
            satisfaction_effect: -2,
            kind: BuildingKind::Infrastructure(Utility {
                jobs: Workforce::new(40),
                production: Resources::new(200.0, 0.0),
            }),
        }
    }

    pub fn utility_plant(&mut self, position: Position) -> Building {
        Building {
            id: BuildingId::default(),
            name: self
                .names
                .random_name(BuildingType::UtilityPlant, &mut self.rng),
            building_type: BuildingType::UtilityPlant,
            position,
            surface: Surface::new(1.0, 1.0),
            cost: 60.0,
            consumption: Resources::new(0.0, 0.0),
            pollution: 45.0,
            satisfaction_effect: -6,
            kind: BuildingKind::Infrastructure(Utility {
                jobs: Workforce::new(45),
                production: Resources::new(150.0, 150.0),
            }),
        }
    }

    pub fn park(&mut self, position: Position) -> Building {
        Building {
            id: BuildingId::default(),
            name: self.names.random_name(BuildingType::Park, &mut self.rng),
            building_type: BuildingType::Park,
            position,
            surface: Surface::new(2.0, 2.0),
            cost: 1500.0,
            consumption: Resources::new(25.0, 5.0),
            pollution: -15.0,
            satisfaction_effect: 80,
            kind: BuildingKind::Park(Grounds {
                jobs: Workforce::new(8),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn factory() -> BuildingFactory {
        BuildingFactory::new(
            Tuning::default(),
            NameCatalog::defaults(),
            ChaCha8Rng::seed_from_u64(5),
        )
    }

    #[test]
    fn house_blueprint() {
        let house = factory().house(Position::new(2, 3));
        assert_eq!(house.cost, 30.0);
        assert_eq!(house.housing().unwrap().capacity, 6);
        assert_eq!(house.consumption, Resources::new(3.0, 1.8));
        assert_eq!(house.satisfaction_effect, 6);
    }

    #[test]
    fn mall_profit_reflects_efficiency() {
        let mall = factory().mall(Position::new(0, 0));
        let commerce = mall.commerce().unwrap();
        assert_eq!(commerce.base_profit, 80.0);
        assert_eq!(commerce.jobs.needed, 50);
    }

    #[test]
    fn apartment_floor_validation() {
        let mut factory = factory();
        assert!(matches!(
            factory.apartment(Position::new(0, 0), 0),
            Err(BuildingError::NoFloors)
        ));
        assert!(matches!(
            factory.apartment(Position::new(0, 0), 5),
            Err(BuildingError::FloorLimit { max: 4 })
        ));
        let two_floors = factory.apartment(Position::new(0, 0), 2).unwrap();
        assert_eq!(two_floors.housing().unwrap().capacity, 4);
        assert_eq!(two_floors.cost, 30.0);
    }

    #[test]
    fn build_dispatches_every_type() {
        let mut factory = factory();
        for (i, building_type) in [
            BuildingType::House,
            BuildingType::Apartment,
            BuildingType::Cinema,
            BuildingType::Mall,
            BuildingType::Bank,
            BuildingType::PowerPlant,
            BuildingType::WaterTreatmentPlant,
            BuildingType::UtilityPlant,
            BuildingType::Park,
        ]
        .into_iter()
        .enumerate()
        {
            let built = factory
                .build(building_type, Position::new(i as i32, 0), 1)
                .unwrap();
            assert_eq!(built.building_type, building_type);
        }
    }
}
