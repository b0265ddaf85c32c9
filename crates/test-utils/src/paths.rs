//! On-disk fixtures: temporary directories, collections, tables and catalogs.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use alti_common::{Dataset, HalfOrbit};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes one JSON file per half-orbit under `dir`, following the
/// collection naming convention.
///
/// Returns the written paths in input order.
pub fn write_collection(dir: &Path, prefix: &str, tracks: &[(HalfOrbit, Dataset)]) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).expect("Failed to create collection directory");
    tracks
        .iter()
        .map(|(half_orbit, dataset)| {
            let period = dataset
                .time_extent("time")
                .expect("track has a time variable")
                .expect("track is not empty");
            let path = dir.join(half_orbit.file_name(prefix, &period));
            write_json(&path, dataset);
            path
        })
        .collect()
}

/// Writes a dataset as a JSON table file.
pub fn write_json(path: &Path, dataset: &Dataset) {
    let writer = BufWriter::new(File::create(path).expect("Failed to create dataset file"));
    serde_json::to_writer(writer, dataset).expect("Failed to encode dataset");
}

/// Writes a catalog file named `catalog.yaml` under `dir`.
pub fn write_catalog(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("catalog.yaml");
    std::fs::write(&path, yaml).expect("Failed to write catalog");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::time::epoch;
    use crate::generators::create_half_orbit_track;

    #[test]
    fn test_write_collection_names() {
        let dir = temp_test_dir();
        let track = create_half_orbit_track(1, 2, epoch(), 3);
        let paths = write_collection(dir.path(), "ALTI", &[(HalfOrbit::new(1, 2), track)]);
        assert_eq!(paths.len(), 1);
        assert_eq!(
            paths[0].file_name().unwrap().to_string_lossy(),
            "ALTI_001_002_20200101T000000_20200101T000200.json"
        );
        assert!(paths[0].exists());
    }
}
