//! YAML scenario files.
//!
//! A scenario names the city, fixes difficulty and seed, and lists the
//! buildings standing at cycle zero. Individual tuning constants may be
//! overridden under `tuning:`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::buildings::BuildingFactory;
use crate::config::Tuning;
use crate::names::NameCatalog;
use crate::rng::RngManager;
use crate::simulation::Simulation;
use crate::types::{BuildingType, Difficulty, Position};

fn default_cycles() -> u32 {
    120
}

fn default_snapshot_interval() -> u32 {
    10
}

fn default_floors() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub seed: u64,
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_cycles: u32,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub buildings: Vec<Placement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub x: i32,
    pub y: i32,
    /// Initial residents, residential types only.
    #[serde(default)]
    pub occupants: u32,
    /// Apartments only.
    #[serde(default = "default_floors")]
    pub floors: u32,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Construct the simulation and place the initial buildings.
    pub fn build_simulation(&self, names: &NameCatalog) -> Result<Simulation> {
        let mut simulation =
            Simulation::new(&self.name, self.difficulty, self.tuning.clone(), self.seed);
        let mut factory = BuildingFactory::new(
            self.tuning.clone(),
            names.clone(),
            RngManager::new(self.seed).fork(),
        );
        for placement in &self.buildings {
            let building = factory
                .build(
                    placement.building_type,
                    Position::new(placement.x, placement.y),
                    placement.floors,
                )
                .with_context(|| {
                    format!(
                        "invalid {} placement at ({}, {})",
                        placement.building_type, placement.x, placement.y
                    )
                })?;
            let id = simulation.add_building(building);
            if placement.occupants > 0 {
                simulation.city_mut().move_in(id, placement.occupants);
            }
        }
        Ok(simulation)
    }

    pub fn cycles(&self, override_cycles: Option<u32>) -> u32 {
        override_cycles.unwrap_or(self.cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO_YAML: &str = r#"
name: Testburg
difficulty: Medium
seed: 99
cycles: 12
buildings:
  - { type: House, x: 1, y: 1, occupants: 4 }
  - { type: Apartment, x: 2, y: 1, floors: 3 }
  - { type: Cinema, x: 4, y: 4 }
"#;

    #[test]
    fn scenario_parses_and_builds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SCENARIO_YAML.as_bytes()).unwrap();

        let loader = ScenarioLoader::new(dir.path());
        let scenario = loader.load("test.yaml").unwrap();
        assert_eq!(scenario.name, "Testburg");
        assert_eq!(scenario.cycles(None), 12);
        assert_eq!(scenario.cycles(Some(5)), 5);

        let sim = scenario.build_simulation(&NameCatalog::defaults()).unwrap();
        assert_eq!(sim.city().buildings().len(), 3);
        assert_eq!(sim.city().population_in_buildings(), 4);
        assert_eq!(sim.city().housing_capacity(), 12);
        // Medium start minus house, apartment and cinema costs.
        assert_eq!(sim.city().budget(), 1000.0 - 30.0 - 45.0 - 500.0);
    }

    #[test]
    fn invalid_placement_is_an_error() {
        let scenario: Scenario = serde_yaml::from_str(
            r#"
name: Broken
difficulty: Easy
seed: 1
buildings:
  - { type: Apartment, x: 0, y: 0, floors: 9 }
"#,
        )
        .unwrap();
        assert!(scenario.build_simulation(&NameCatalog::defaults()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let loader = ScenarioLoader::new("/nonexistent");
        assert!(loader.load("nope.yaml").is_err());
    }
}
