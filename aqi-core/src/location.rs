use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub coordinate: Coordinate,
}

/// Monitored cities. The first entry is the default primary location.
const LOCATIONS: &[Location] = &[
    Location { name: "Nagpur", coordinate: Coordinate::new(21.1458, 79.0882) },
    Location { name: "Adilabad", coordinate: Coordinate::new(19.68, 78.53) },
    Location { name: "Durg", coordinate: Coordinate::new(21.19, 81.28) },
    Location { name: "Chhindwara", coordinate: Coordinate::new(22.06, 78.94) },
    Location { name: "Amravati", coordinate: Coordinate::new(20.93, 77.75) },
];

/// Static name → coordinate table with one designated primary location.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: &'static [Location],
    primary: &'static str,
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self { locations: LOCATIONS, primary: LOCATIONS[0].name }
    }
}

impl LocationRegistry {
    /// Registry with a different primary location. The name must already be registered.
    pub fn with_primary(name: &str) -> Result<Self> {
        let registry = Self::default();
        let primary = registry.get(name)?.name;
        Ok(Self { primary, ..registry })
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Result<&'static Location> {
        self.locations
            .iter()
            .find(|loc| loc.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownLocation(name.to_string()))
    }

    pub fn coordinate(&self, name: &str) -> Result<Coordinate> {
        self.get(name).map(|loc| loc.coordinate)
    }

    pub fn primary(&self) -> &'static str {
        self.primary
    }

    pub fn is_primary(&self, name: &str) -> bool {
        self.primary.eq_ignore_ascii_case(name.trim())
    }

    /// Every registered location, in registration order.
    pub fn all(&self) -> &'static [Location] {
        self.locations
    }

    /// Every location except the primary, in registration order.
    pub fn secondaries(&self) -> Vec<&'static str> {
        self.locations.iter().map(|loc| loc.name).filter(|name| *name != self.primary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_primary_is_nagpur() {
        let registry = LocationRegistry::default();
        assert_eq!(registry.primary(), "Nagpur");
        assert!(registry.is_primary("nagpur"));
        assert!(!registry.is_primary("Durg"));
    }

    #[test]
    fn lookup_is_case_insensitive_and_returns_canonical_name() {
        let registry = LocationRegistry::default();
        let loc = registry.get("  chhindwara ").expect("registered");
        assert_eq!(loc.name, "Chhindwara");
        assert_eq!(loc.coordinate, Coordinate::new(22.06, 78.94));
    }

    #[test]
    fn unknown_location_errors() {
        let registry = LocationRegistry::default();
        let err = registry.coordinate("Atlantis").unwrap_err();
        assert_eq!(err, Error::UnknownLocation("Atlantis".into()));
    }

    #[test]
    fn secondaries_exclude_primary_and_keep_order() {
        let registry = LocationRegistry::default();
        assert_eq!(registry.secondaries(), vec!["Adilabad", "Durg", "Chhindwara", "Amravati"]);
    }

    #[test]
    fn with_primary_moves_designation() {
        let registry = LocationRegistry::with_primary("durg").expect("registered");
        assert_eq!(registry.primary(), "Durg");
        assert!(registry.secondaries().contains(&"Nagpur"));
        assert!(!registry.secondaries().contains(&"Durg"));

        assert!(LocationRegistry::with_primary("Atlantis").is_err());
    }
}
