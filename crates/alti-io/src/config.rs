//! Configuration for altimetry data access.

use std::collections::HashSet;
use std::path::PathBuf;

use alti_common::{AltiError, AltiResult, CoordinateNames};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CATALOG_ENV};

/// Runtime configuration, usually read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AltimetryConfig {
    /// Catalog file to resolve collection names against.
    pub catalog: Option<PathBuf>,

    /// Coordinate names used by sources opened outside a catalog.
    pub coordinates: CoordinateNames,
}

impl AltimetryConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `ALTI_CATALOG` | `catalog` |
    /// | `ALTI_TIME_NAME` | `coordinates.time` |
    /// | `ALTI_LONGITUDE_NAME` | `coordinates.longitude` |
    /// | `ALTI_LATITUDE_NAME` | `coordinates.latitude` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(CATALOG_ENV) {
            config.catalog = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("ALTI_TIME_NAME") {
            config.coordinates.time = val;
        }

        if let Some(val) = lookup("ALTI_LONGITUDE_NAME") {
            config.coordinates.longitude = val;
        }

        if let Some(val) = lookup("ALTI_LATITUDE_NAME") {
            config.coordinates.latitude = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AltiResult<()> {
        let names = self.coordinates.as_array();
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(AltiError::Config(
                "coordinate names must not be empty".to_string(),
            ));
        }

        let unique: HashSet<&str> = names.iter().copied().collect();
        if unique.len() != names.len() {
            return Err(AltiError::Config(format!(
                "coordinate names must be distinct: {:?}",
                names
            )));
        }

        Ok(())
    }

    /// Load the configured catalog.
    pub fn load_catalog(&self) -> AltiResult<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => Err(AltiError::Config(format!("{} is not set", CATALOG_ENV))),
        }
    }
}
