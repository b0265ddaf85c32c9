//! Catalog of named altimetry collections.
//!
//! A catalog is a YAML file listing collections by name:
//!
//! ```yaml
//! collections:
//!   swot_l3:
//!     kind: files
//!     path: swot/l3
//!     description: SWOT L3 sea surface height
//!   tracks:
//!     kind: table
//!     path: tracks.json
//!     coordinates:
//!       time: time
//!       longitude: lon
//!       latitude: lat
//!     orbit_columns:
//!       cycle: cycle
//!       pass: pass
//! ```
//!
//! Relative paths are resolved against the directory of the catalog file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alti_common::{AltiError, AltiResult, CoordinateNames};
use serde::Deserialize;
use tracing::{debug, info};

use crate::table::OrbitColumns;

/// Environment variable naming the default catalog file.
pub const CATALOG_ENV: &str = "ALTI_CATALOG";

/// Storage layout of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// A directory of half-orbit files.
    Files,
    /// A single JSON table.
    Table,
}

/// One collection of a catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub kind: CollectionKind,
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coordinates: CoordinateNames,
    #[serde(default)]
    pub orbit_columns: OrbitColumns,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    collections: BTreeMap<String, CatalogEntry>,
}

/// A loaded catalog with paths resolved.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Load the catalog named by [`CATALOG_ENV`].
    pub fn from_env() -> AltiResult<Self> {
        let path = std::env::var(CATALOG_ENV)
            .map_err(|_| AltiError::Catalog(format!("{} is not set", CATALOG_ENV)))?;
        Self::load(path)
    }

    /// Load a catalog file.
    pub fn load(path: impl AsRef<Path>) -> AltiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AltiError::Catalog(format!("failed to read {}: {}", path.display(), e))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut catalog = Self::from_yaml(&content, base)?;
        catalog.path = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            collections = catalog.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse catalog YAML, resolving relative paths against `base`.
    pub fn from_yaml(content: &str, base: &Path) -> AltiResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)
            .map_err(|e| AltiError::Catalog(format!("invalid catalog: {}", e)))?;

        let entries = file
            .collections
            .into_iter()
            .map(|(name, mut entry)| {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
                debug!(collection = %name, path = %entry.path.display(), "Catalog entry");
                (name, entry)
            })
            .collect();

        Ok(Self {
            path: None,
            entries,
        })
    }

    /// File the catalog was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entry(&self, name: &str) -> AltiResult<&CatalogEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| AltiError::Catalog(format!("unknown collection: {}", name)))
    }

    /// Collection names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
collections:
  swot:
    kind: files
    path: swot/l3
    description: SWOT L3
  tracks:
    kind: table
    path: /abs/tracks.json
    coordinates:
      time: t
      longitude: lon
      latitude: lat
    orbit_columns:
      cycle: cycle
      pass: pass
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_yaml(YAML, Path::new("/data")).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["swot", "tracks"]);

        let swot = catalog.entry("swot").unwrap();
        assert_eq!(swot.kind, CollectionKind::Files);
        assert_eq!(swot.path, PathBuf::from("/data/swot/l3"));
        assert_eq!(swot.coordinates, CoordinateNames::default());
        assert_eq!(swot.orbit_columns, OrbitColumns::default());

        let tracks = catalog.entry("tracks").unwrap();
        assert_eq!(tracks.kind, CollectionKind::Table);
        assert_eq!(tracks.path, PathBuf::from("/abs/tracks.json"));
        assert_eq!(tracks.coordinates.longitude, "lon");
        assert_eq!(tracks.orbit_columns.cycle, "cycle");
    }

    #[test]
    fn test_unknown_collection() {
        let catalog = Catalog::from_yaml(YAML, Path::new("/data")).unwrap();
        assert!(matches!(catalog.entry("nope"), Err(AltiError::Catalog(_))));
    }

    #[test]
    fn test_invalid_catalog() {
        let yaml = "collections:\n  x:\n    kind: zarr\n    path: x\n";
        assert!(matches!(
            Catalog::from_yaml(yaml, Path::new("")),
            Err(AltiError::Catalog(_))
        ));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::from_yaml("{}", Path::new("")).unwrap();
        assert!(catalog.is_empty());
    }
}
