use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Combat-relevant numbers resolved from a unit definition.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct UnitSpec {
    /// Longest range of any weapon mounted on the unit, in hexes.
    pub max_weapon_range: u32,
    /// Sum of the per-shot damage of every mounted weapon.
    pub total_damage: f64,
}

/// Resolves a chassis/model pair to its unit definition.
///
/// Lookups degrade rather than fail: an unknown unit yields `None` and the
/// parser substitutes zeroed stats.
pub trait UnitCatalog: fmt::Debug {
    fn lookup(&self, chassis: &str, model: &str) -> Option<UnitSpec>;
}

/// Catalog backed by an in-memory map keyed by `"Chassis Model"`.
///
/// Deserializes directly from a JSON object of that shape, so a definitions
/// file can be loaded with `serde_json` and used as-is.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StaticUnitCatalog {
    units: HashMap<String, UnitSpec>,
}

impl StaticUnitCatalog {
    #[must_use]
    pub fn new(units: HashMap<String, UnitSpec>) -> Self {
        Self { units }
    }

    pub fn insert(&mut self, chassis: &str, model: &str, spec: UnitSpec) {
        self.units.insert(Self::key(chassis, model), spec);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn key(chassis: &str, model: &str) -> String {
        format!("{chassis} {model}")
    }
}

impl UnitCatalog for StaticUnitCatalog {
    fn lookup(&self, chassis: &str, model: &str) -> Option<UnitSpec> {
        self.units.get(&Self::key(chassis, model)).copied()
    }
}

/// Catalog that resolves nothing; every unit parses with zeroed stats.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyUnitCatalog;

impl UnitCatalog for EmptyUnitCatalog {
    fn lookup(&self, _chassis: &str, _model: &str) -> Option<UnitSpec> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_keyed_by_chassis_and_model() {
        let mut catalog = StaticUnitCatalog::default();
        catalog.insert(
            "Mad Cat",
            "Prime",
            UnitSpec {
                max_weapon_range: 22,
                total_damage: 51.0,
            },
        );

        assert!(catalog.lookup("Mad Cat", "Prime").is_some());
        assert!(catalog.lookup("Mad Cat", "A").is_none());
        assert!(catalog.lookup("Prime", "Mad Cat").is_none());
    }

    #[test]
    fn deserializes_from_plain_json_object() {
        let catalog: StaticUnitCatalog = serde_json::from_str(
            r#"{"Atlas AS7-D": {"max_weapon_range": 24, "total_damage": 68.5}}"#,
        )
        .unwrap();

        let spec = catalog.lookup("Atlas", "AS7-D").unwrap();
        assert_eq!(spec.max_weapon_range, 24);
        assert!((spec.total_damage - 68.5).abs() < f64::EPSILON);
    }
}
