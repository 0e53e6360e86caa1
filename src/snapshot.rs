//! Serializable views of the simulation, for observers and periodic dumps.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::events::{EventCategory, EventSeverity};
use crate::simulation::Simulation;
use crate::types::{BuildingType, Resources, SimState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub id: u32,
    pub name: String,
    pub building_type: BuildingType,
    pub x: i32,
    pub y: i32,
    pub width: f32,
    pub length: f32,
    pub occupants: Option<u32>,
    pub capacity: Option<u32>,
    pub jobs: Option<u32>,
    pub employed: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub id: u32,
    pub name: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    pub remaining_cycles: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub city: String,
    pub cycle: u32,
    pub state: SimState,
    pub captured_at: String,
    pub budget: f64,
    pub population: u32,
    pub satisfaction: i32,
    pub pollution: f64,
    pub resources: Resources,
    pub consumption: Resources,
    pub job_capacity: u32,
    pub employed: u32,
    pub unemployment_rate: f64,
    pub buildings: Vec<BuildingSnapshot>,
    pub active_event: Option<EventSnapshot>,
}

impl CitySnapshot {
    pub fn capture(simulation: &Simulation) -> Self {
        let city = simulation.city();
        let buildings = city
            .buildings()
            .iter()
            .map(|building| BuildingSnapshot {
                id: building.id.raw(),
                name: building.name.clone(),
                building_type: building.building_type,
                x: building.position.x,
                y: building.position.y,
                width: building.surface.width,
                length: building.surface.length,
                occupants: building.housing().map(|h| h.occupants),
                capacity: building.housing().map(|h| h.capacity),
                jobs: building.workforce().map(|w| w.needed),
                employed: building.workforce().map(|w| w.filled),
            })
            .collect();
        let active_event = simulation.active_event().map(|active| EventSnapshot {
            id: active.event.id,
            name: active.event.name.clone(),
            category: active.event.category,
            severity: active.event.severity,
            remaining_cycles: active.remaining_cycles,
        });
        Self {
            city: city.name().to_string(),
            cycle: simulation.cycle(),
            state: simulation.state(),
            captured_at: chrono::Utc::now().to_rfc3339(),
            budget: city.budget(),
            population: city.population(),
            satisfaction: city.satisfaction(),
            pollution: city.pollution(),
            resources: city.resources(),
            consumption: city.total_consumption(),
            job_capacity: city.job_capacity(),
            employed: city.employed_count(),
            unemployment_rate: city.unemployment_rate(),
            buildings,
            active_event,
        }
    }
}

/// Writes a JSON frame every `interval_cycles` cycles. An interval of zero
/// disables writing entirely.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_cycles: u32,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_cycles: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_cycles,
        }
    }

    pub fn maybe_write(&self, simulation: &Simulation) -> Result<Option<PathBuf>> {
        let cycle = simulation.cycle();
        if self.interval_cycles == 0 || cycle == 0 || cycle % self.interval_cycles != 0 {
            return Ok(None);
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create snapshot dir {}", self.dir.display()))?;
        let path = self.dir.join(format!("cycle_{cycle:05}.json"));
        let snapshot = CitySnapshot::capture(simulation);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
