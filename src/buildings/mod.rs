//! Building model.
//!
//! One `Building` struct carries the fields every variant shares; the
//! variant-specific state hangs off [`BuildingKind`]. Behavior is dispatched
//! by matching on the kind rather than through a type hierarchy.

mod commercial;
mod factory;
mod infrastructure;
mod park;
mod residential;

pub use commercial::Commerce;
pub use factory::BuildingFactory;
pub use infrastructure::Utility;
pub use park::Grounds;
pub use residential::Housing;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BuildingType, Position, Resources, Surface};

/// Stable handle assigned by the owning city at insertion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BuildingId(pub u32);

impl BuildingId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Employee slots of a service building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workforce {
    pub needed: u32,
    pub filled: u32,
}

impl Workforce {
    pub fn new(needed: u32) -> Self {
        Self { needed, filled: 0 }
    }

    pub fn fully_staffed(&self) -> bool {
        self.filled >= self.needed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BuildingKind {
    Residential(Housing),
    Commercial(Commerce),
    Infrastructure(Utility),
    Park(Grounds),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildingError {
    #[error("apartments cannot exceed {max} floors")]
    FloorLimit { max: u32 },
    #[error("apartments need at least one floor")]
    NoFloors,
    #[error("removing the floor would displace {occupants} current residents")]
    FloorOccupied { occupants: u32 },
    #[error("only apartments have floors")]
    NotAnApartment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub building_type: BuildingType,
    pub position: Position,
    pub surface: Surface,
    /// Construction cost, deducted from the city budget when the building is
    /// added and refunded when it is removed.
    pub cost: f64,
    pub consumption: Resources,
    pub pollution: f64,
    pub satisfaction_effect: i32,
    pub kind: BuildingKind,
}

impl Building {
    pub fn is_residential(&self) -> bool {
        matches!(self.kind, BuildingKind::Residential(_))
    }

    /// Every non-residential variant carries employee slots.
    pub fn is_service(&self) -> bool {
        !self.is_residential()
    }

    pub fn housing(&self) -> Option<&Housing> {
        match &self.kind {
            BuildingKind::Residential(housing) => Some(housing),
            _ => None,
        }
    }

    pub fn housing_mut(&mut self) -> Option<&mut Housing> {
        match &mut self.kind {
            BuildingKind::Residential(housing) => Some(housing),
            _ => None,
        }
    }

    pub fn workforce(&self) -> Option<&Workforce> {
        match &self.kind {
            BuildingKind::Residential(_) => None,
            BuildingKind::Commercial(commerce) => Some(&commerce.jobs),
            BuildingKind::Infrastructure(utility) => Some(&utility.jobs),
            BuildingKind::Park(grounds) => Some(&grounds.jobs),
        }
    }

    pub fn workforce_mut(&mut self) -> Option<&mut Workforce> {
        match &mut self.kind {
            BuildingKind::Residential(_) => None,
            BuildingKind::Commercial(commerce) => Some(&mut commerce.jobs),
            BuildingKind::Infrastructure(utility) => Some(&mut utility.jobs),
            BuildingKind::Park(grounds) => Some(&mut grounds.jobs),
        }
    }

    pub fn commerce(&self) -> Option<&Commerce> {
        match &self.kind {
            BuildingKind::Commercial(commerce) => Some(commerce),
            _ => None,
        }
    }

    /// Resource output per cycle, for infrastructure.
    pub fn production(&self) -> Option<Resources> {
        match &self.kind {
            BuildingKind::Infrastructure(utility) => Some(utility.production),
            _ => None,
        }
    }

    /// Footprint hit-test used by the presentation layer to map a grid cell
    /// back to a building.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        x >= self.position.x
            && x < self.position.x + self.surface.length as i32
            && y >= self.position.y
            && y < self.position.y + self.surface.width as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::names::NameCatalog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn factory() -> BuildingFactory {
        BuildingFactory::new(
            Tuning::default(),
            NameCatalog::defaults(),
            ChaCha8Rng::seed_from_u64(11),
        )
    }

    #[test]
    fn footprint_hit_test() {
        let mut factory = factory();
        let mall = factory.mall(Position::new(4, 4));
        assert!(mall.covers(4, 4));
        assert!(mall.covers(6, 6));
        assert!(!mall.covers(7, 4));
        assert!(!mall.covers(3, 4));
    }

    #[test]
    fn kind_accessors() {
        let mut factory = factory();
        let house = factory.house(Position::new(0, 0));
        assert!(house.is_residential());
        assert!(house.workforce().is_none());
        assert!(house.housing().is_some());

        let plant = factory.power_plant(Position::new(1, 0));
        assert!(plant.is_service());
        assert_eq!(plant.workforce().unwrap().needed, 40);
        assert_eq!(plant.production().unwrap(), Resources::new(0.0, 200.0));
    }
}
