pub mod buildings;
pub mod city;
pub mod config;
pub mod events;
pub mod names;
pub mod rng;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
pub mod types;
pub mod web;

pub use city::City;
pub use config::Tuning;
pub use scenario::{Scenario, ScenarioLoader};
pub use simulation::Simulation;
pub use types::{Difficulty, SimState};
