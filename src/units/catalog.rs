//! Named unit templates
//!
//! Waves and scenarios refer to units by name; the catalog resolves those
//! names to stats. A name missing from the catalog is a configuration
//! error for that one unit only.

use ahash::AHashMap;

use crate::core::error::{BattleError, Result};
use crate::units::stats::UnitStats;

#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: AHashMap<String, UnitStats>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating every entry
    pub fn from_stats(stats: impl IntoIterator<Item = UnitStats>) -> Result<Self> {
        let mut catalog = Self::new();
        for s in stats {
            catalog.insert(s)?;
        }
        Ok(catalog)
    }

    /// Add or replace a template
    pub fn insert(&mut self, stats: UnitStats) -> Result<()> {
        stats.validate()?;
        self.units.insert(stats.name.clone(), stats);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&UnitStats> {
        self.units.get(name)
    }

    /// Look up a template, reporting a missing one as a configuration error
    pub fn resolve(&self, name: &str) -> Result<&UnitStats> {
        self.units
            .get(name)
            .ok_or_else(|| BattleError::ConfigurationMissing(format!("unit '{}'", name)))
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::stats::Team;

    #[test]
    fn test_resolve_known_unit() {
        let catalog = UnitCatalog::from_stats([UnitStats::new("Knight", Team::Friendly)]).unwrap();
        assert_eq!(catalog.resolve("Knight").unwrap().name, "Knight");
    }

    #[test]
    fn test_missing_unit_is_configuration_error() {
        let catalog = UnitCatalog::new();
        assert!(matches!(
            catalog.resolve("Ghost"),
            Err(BattleError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_invalid_stats_rejected() {
        let mut catalog = UnitCatalog::new();
        let bad = UnitStats::new("Broken", Team::Enemy).with_health(0);
        assert!(catalog.insert(bad).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_names_sorted() {
        let catalog = UnitCatalog::from_stats([
            UnitStats::new("Orc", Team::Enemy),
            UnitStats::new("Archer", Team::Friendly),
        ])
        .unwrap();
        assert_eq!(catalog.names(), vec!["Archer", "Orc"]);
    }
}
