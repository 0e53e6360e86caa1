//! Occupancy and floor mechanics for residential buildings.

use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::types::Resources;

use super::{Building, BuildingError, BuildingKind};

/// Residential state. `floors` is populated for apartments only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Housing {
    pub capacity: u32,
    pub occupants: u32,
    pub floors: Option<u32>,
}

impl Housing {
    pub fn vacancies(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants)
    }
}

impl Building {
    /// Move `count` people in, clamped at capacity. Consumption is fully
    /// recomputed from the new occupancy, replacing whatever was stored.
    pub fn add_occupants(&mut self, count: u32, tuning: &Tuning) {
        if let BuildingKind::Residential(housing) = &mut self.kind {
            housing.occupants = (housing.occupants + count).min(housing.capacity);
            self.consumption = per_occupant_consumption(housing.occupants, tuning);
        }
    }

    /// Move `count` people out, clamped at zero, with the same consumption
    /// recompute as [`Building::add_occupants`].
    pub fn remove_occupants(&mut self, count: u32, tuning: &Tuning) {
        if let BuildingKind::Residential(housing) = &mut self.kind {
            housing.occupants = housing.occupants.saturating_sub(count);
            self.consumption = per_occupant_consumption(housing.occupants, tuning);
        }
    }

    /// Add one floor to an apartment. Exceeding the floor maximum is a
    /// rejected operation: the error is returned and nothing changes.
    pub fn add_floor(&mut self, tuning: &Tuning) -> Result<(), BuildingError> {
        let housing = match &mut self.kind {
            BuildingKind::Residential(housing) if housing.floors.is_some() => housing,
            _ => return Err(BuildingError::NotAnApartment),
        };
        let floors = housing.floors.unwrap_or(0);
        if floors >= tuning.apartment_max_floors {
            return Err(BuildingError::FloorLimit {
                max: tuning.apartment_max_floors,
            });
        }
        housing.floors = Some(floors + 1);
        housing.capacity += tuning.apartment_capacity_per_floor;
        self.cost += tuning.apartment_cost_per_floor;
        self.pollution += tuning.apartment_pollution_per_floor;
        self.satisfaction_effect += tuning.apartment_satisfaction_per_floor;
        self.consumption += Resources::new(
            tuning.apartment_water_per_floor,
            tuning.apartment_electricity_per_floor,
        );
        Ok(())
    }

    /// Remove one floor from an apartment. Rejected when only one floor is
    /// left or when the lost capacity would displace current residents.
    pub fn remove_floor(&mut self, tuning: &Tuning) -> Result<(), BuildingError> {
        let housing = match &mut self.kind {
            BuildingKind::Residential(housing) if housing.floors.is_some() => housing,
            _ => return Err(BuildingError::NotAnApartment),
        };
        let floors = housing.floors.unwrap_or(0);
        if floors <= 1 {
            return Err(BuildingError::NoFloors);
        }
        let reduced_capacity = housing
            .capacity
            .saturating_sub(tuning.apartment_capacity_per_floor);
        if housing.occupants > reduced_capacity {
            return Err(BuildingError::FloorOccupied {
                occupants: housing.occupants,
            });
        }
        housing.floors = Some(floors - 1);
        housing.capacity = reduced_capacity;
        self.cost -= tuning.apartment_cost_per_floor;
        self.pollution -= tuning.apartment_pollution_per_floor;
        self.satisfaction_effect -= tuning.apartment_satisfaction_per_floor;
        self.consumption -= Resources::new(
            tuning.apartment_water_per_floor,
            tuning.apartment_electricity_per_floor,
        );
        Ok(())
    }
}

fn per_occupant_consumption(occupants: u32, tuning: &Tuning) -> Resources {
    Resources::new(
        occupants as f64 * tuning.water_per_person,
        occupants as f64 * tuning.electricity_per_person,
    )
}
