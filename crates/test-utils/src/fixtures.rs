//! Common test fixtures for altimetry tests.
//!
//! This module provides pre-defined polygons, periods and catalog snippets
//! that represent common query scenarios.

/// Common polygons, as WKT or (lon_min, lon_max, lat_min, lat_max) boxes.
pub mod polygon {
    /// Covers every point of the simple dataset, boundary included.
    pub const GLOBE_WKT: &str =
        "POLYGON((-180.05 -60.05, -180.05 40.05, 180.05 40.05, 180.05 -60.05, -180.05 -60.05))";

    /// Mediterranean Sea
    pub const MEDITERRANEAN_WKT: &str =
        "POLYGON((-6 30, -6 46, 36 46, 36 30, -6 30))";

    /// Two disjoint boxes on either side of the prime meridian.
    pub const TWO_BOXES_WKT: &str =
        "MULTIPOLYGON(((-90 -50, -90 -30, -70 -30, -70 -50, -90 -50)),((70 30, 70 50, 90 50, 90 30, 70 30)))";

    /// Arctic box that contains no point of the simple dataset.
    pub const ARCTIC: (f64, f64, f64, f64) = (-180.0, 180.0, 70.0, 90.0);

    /// Box around the origin.
    pub const EQUATOR: (f64, f64, f64, f64) = (-1.0, 1.0, -1.0, 1.0);

    /// Pacific box expressed in [0, 360) longitudes.
    pub const PACIFIC_360: (f64, f64, f64, f64) = (150.0, 250.0, -30.0, 30.0);
}

/// Common reference times and periods.
pub mod time {
    use alti_common::Period;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    /// Reference time of generated missions.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    /// Time `secs` seconds after [`epoch`].
    pub fn at(secs: i64) -> DateTime<Utc> {
        epoch() + Duration::seconds(secs)
    }

    /// Period between two offsets from [`epoch`], in seconds.
    pub fn between(start_secs: i64, end_secs: i64) -> Period {
        Period::new(at(start_secs), at(end_secs))
    }

    /// The whole of 2020-01-01, as covered by the simple dataset.
    pub fn first_day() -> Period {
        Period::new(epoch(), epoch() + Duration::days(1))
    }

    /// A period entirely before any generated data.
    pub fn before_mission() -> Period {
        Period::new(epoch() - Duration::days(30), epoch() - Duration::days(29))
    }
}

/// Catalog file snippets.
pub mod catalog {
    /// YAML for one collection entry, indented for a `collections:` map.
    pub fn entry(name: &str, kind: &str, path: &str) -> String {
        format!("  {}:\n    kind: {}\n    path: {}\n", name, kind, path)
    }

    /// A full catalog document from pre-rendered entries.
    pub fn document(entries: &[String]) -> String {
        let mut yaml = String::from("collections:\n");
        for entry in entries {
            yaml.push_str(entry);
        }
        yaml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_are_ordered() {
        assert!(time::first_day().validate().is_ok());
        assert!(time::before_mission().validate().is_ok());
        assert!(time::before_mission().end < time::epoch());
        assert_eq!(time::between(0, 60).duration().num_seconds(), 60);
    }

    #[test]
    fn test_catalog_document() {
        let yaml = catalog::document(&[
            catalog::entry("a", "files", "a"),
            catalog::entry("b", "table", "b.json"),
        ]);
        assert!(yaml.starts_with("collections:\n  a:\n    kind: files"));
        assert!(yaml.contains("  b:\n    kind: table\n    path: b.json\n"));
    }
}
