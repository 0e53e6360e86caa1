use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Grid cell occupied by a building's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, other: Position) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl SubAssign for Position {
    fn sub_assign(&mut self, other: Position) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Footprint of a building in grid cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub length: f32,
}

impl Surface {
    pub fn new(width: f32, length: f32) -> Self {
        Self { width, length }
    }

    pub fn area(&self) -> f32 {
        self.width * self.length
    }
}

/// City-wide resource bundle: water and electricity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub water: f64,
    pub electricity: f64,
}

impl Resources {
    pub fn new(water: f64, electricity: f64) -> Self {
        Self { water, electricity }
    }

    /// Componentwise scaling, used when an active event inflates consumption.
    pub fn scaled(&self, water_factor: f64, electricity_factor: f64) -> Resources {
        Resources {
            water: self.water * water_factor,
            electricity: self.electricity * electricity_factor,
        }
    }
}

impl Add for Resources {
    type Output = Resources;

    fn add(self, other: Resources) -> Resources {
        Resources {
            water: self.water + other.water,
            electricity: self.electricity + other.electricity,
        }
    }
}

impl Sub for Resources {
    type Output = Resources;

    fn sub(self, other: Resources) -> Resources {
        Resources {
            water: self.water - other.water,
            electricity: self.electricity - other.electricity,
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, other: Resources) {
        self.water += other.water;
        self.electricity += other.electricity;
    }
}

impl SubAssign for Resources {
    fn sub_assign(&mut self, other: Resources) {
        self.water -= other.water;
        self.electricity -= other.electricity;
    }
}

/// Concrete building type; the coarse-grained grouping lives in
/// [`crate::buildings::BuildingKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    House,
    Apartment,
    Bank,
    PowerPlant,
    WaterTreatmentPlant,
    UtilityPlant,
    Park,
    Cinema,
    Mall,
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildingType::House => "House",
            BuildingType::Apartment => "Apartment",
            BuildingType::Bank => "Bank",
            BuildingType::PowerPlant => "PowerPlant",
            BuildingType::WaterTreatmentPlant => "WaterTreatmentPlant",
            BuildingType::UtilityPlant => "UtilityPlant",
            BuildingType::Park => "Park",
            BuildingType::Cinema => "Cinema",
            BuildingType::Mall => "Mall",
        };
        f.write_str(label)
    }
}

/// Difficulty fixes the starting budget and the cycle length at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn starting_budget(&self) -> f64 {
        match self {
            Difficulty::Easy => 2000.0,
            Difficulty::Medium => 1000.0,
            Difficulty::Hard => 500.0,
        }
    }

    pub fn seconds_per_cycle(&self) -> f32 {
        match self {
            Difficulty::Easy => 120.0,
            Difficulty::Medium => 60.0,
            Difficulty::Hard => 30.0,
        }
    }
}

/// Simulation state machine. `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimState {
    Running,
    Evaluating,
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_algebra() {
        let a = Position::new(3, 4);
        let b = Position::new(1, -2);
        assert_eq!(a + b, Position::new(4, 2));
        assert_eq!(a - b, Position::new(2, 6));
        let mut c = a;
        c += b;
        assert_eq!(c, Position::new(4, 2));
    }

    #[test]
    fn resource_algebra() {
        let mut pool = Resources::new(10.0, 5.0);
        pool -= Resources::new(4.0, 1.0);
        pool += Resources::new(1.0, 1.0);
        assert_eq!(pool, Resources::new(7.0, 5.0));
        assert_eq!(pool.scaled(2.0, 0.5), Resources::new(14.0, 2.5));
    }

    #[test]
    fn difficulty_constants() {
        assert_eq!(Difficulty::Easy.starting_budget(), 2000.0);
        assert_eq!(Difficulty::Medium.seconds_per_cycle(), 60.0);
        assert_eq!(Difficulty::Hard.starting_budget(), 500.0);
    }
}
