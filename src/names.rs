//! Building-name catalog.
//!
//! Names come from a JSON document keyed by building type; a missing or
//! corrupt file falls back to an embedded list. Lookups never fail: an
//! unknown or empty entry yields a placeholder name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::warn;

use crate::types::BuildingType;

const PLACEHOLDER_NAME: &str = "Unnamed Lot";

#[derive(Debug, Clone)]
pub struct NameCatalog {
    names: HashMap<BuildingType, Vec<String>>,
}

impl NameCatalog {
    /// Load the catalog from `path`. Any failure (missing file, bad JSON,
    /// unknown keys) is recovered by falling back to the embedded defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<HashMap<BuildingType, Vec<String>>>(&data) {
                Ok(names) => Self { names },
                Err(err) => {
                    warn!(path = %path.display(), %err, "building-name catalog unreadable, using defaults");
                    Self::defaults()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "building-name catalog missing, using defaults");
                Self::defaults()
            }
        }
    }

    pub fn defaults() -> Self {
        let mut names = HashMap::new();
        names.insert(
            BuildingType::House,
            strings(&["Rosewood Cottage", "Elm Street Home", "Willow House"]),
        );
        names.insert(
            BuildingType::Apartment,
            strings(&["Harbor View Flats", "Midtown Residences", "Linden Towers"]),
        );
        names.insert(
            BuildingType::Park,
            strings(&["Central Park", "Riverside Green", "Old Oak Gardens"]),
        );
        names.insert(
            BuildingType::Cinema,
            strings(&["Grand Odeon", "Starlight Cinema", "The Lumiere"]),
        );
        names.insert(
            BuildingType::Mall,
            strings(&["Galleria Mall", "Market Square", "Northgate Center"]),
        );
        names.insert(
            BuildingType::Bank,
            strings(&["First National", "Union Trust", "Meridian Bank"]),
        );
        names.insert(
            BuildingType::PowerPlant,
            strings(&["Northside Power Station", "Delta Generating Plant"]),
        );
        names.insert(
            BuildingType::WaterTreatmentPlant,
            strings(&["Clearwater Works", "Riverbend Treatment Plant"]),
        );
        names.insert(
            BuildingType::UtilityPlant,
            strings(&["Combined Utility Works", "Eastside Service Complex"]),
        );
        Self { names }
    }

    /// Draw a random name for `kind`. Never fails; unknown or empty entries
    /// yield a placeholder.
    pub fn random_name(&self, kind: BuildingType, rng: &mut impl Rng) -> String {
        match self.names.get(&kind) {
            Some(list) if !list.is_empty() => list[rng.gen_range(0..list.len())].clone(),
            _ => PLACEHOLDER_NAME.to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let catalog = NameCatalog::load("/definitely/not/here.json");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let name = catalog.random_name(BuildingType::House, &mut rng);
        assert_ne!(name, PLACEHOLDER_NAME);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let catalog = NameCatalog::load(file.path());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_ne!(
            catalog.random_name(BuildingType::Bank, &mut rng),
            PLACEHOLDER_NAME
        );
    }

    #[test]
    fn valid_file_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"House": ["Test Villa"]}}"#).unwrap();
        let catalog = NameCatalog::load(file.path());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            catalog.random_name(BuildingType::House, &mut rng),
            "Test Villa"
        );
        // Types absent from the document fall through to the placeholder.
        assert_eq!(
            catalog.random_name(BuildingType::Park, &mut rng),
            PLACEHOLDER_NAME
        );
    }

    #[test]
    fn draws_are_deterministic_per_seed() {
        let catalog = NameCatalog::defaults();
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(
            catalog.random_name(BuildingType::Mall, &mut a),
            catalog.random_name(BuildingType::Mall, &mut b)
        );
    }
}
