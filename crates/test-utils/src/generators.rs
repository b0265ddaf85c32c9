//! Test data generators for creating synthetic along-track data.
//!
//! These generators create predictable, verifiable tracks that can be used
//! across the test suite. Every generated dataset carries the coordinate
//! variables `time`, `longitude` and `latitude`, the orbit columns
//! `cycle_number` and `pass_number`, and two geophysical variables.

use alti_common::{ArrayValues, DataArray, Dataset, HalfOrbit};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Seconds between two consecutive along-track measurements.
pub const MEASUREMENT_STEP_SECS: i64 = 60;

/// Creates a half-orbit track with predictable values.
///
/// Measurement `i` is taken at `start + i * MEASUREMENT_STEP_SECS` and has
/// `sla = cycle * 1000 + pass + i / 1000`, which makes it easy to check that
/// records come from the expected half-orbit.
///
/// Odd passes ascend from 60S to 60N; even passes descend. Longitudes advance
/// by 7 degrees per measurement, wrapped to [-180, 180).
///
/// # Example
///
/// ```
/// use test_utils::create_half_orbit_track;
/// use test_utils::fixtures::time::epoch;
///
/// let track = create_half_orbit_track(1, 3, epoch(), 10);
/// assert_eq!(track.len(), 10);
/// assert_eq!(track.float("sla").unwrap()[0], 1003.0);
/// ```
pub fn create_half_orbit_track(
    cycle_number: u32,
    pass_number: u32,
    start: DateTime<Utc>,
    points: usize,
) -> Dataset {
    let span = points.saturating_sub(1).max(1) as f64;

    let times: Vec<DateTime<Utc>> = (0..points)
        .map(|i| start + Duration::seconds(i as i64 * MEASUREMENT_STEP_SECS))
        .collect();
    let longitudes: Vec<f64> = (0..points)
        .map(|i| wrap(pass_number as f64 * 13.0 + i as f64 * 7.0))
        .collect();
    let latitudes: Vec<f64> = (0..points)
        .map(|i| {
            let lat = -60.0 + 120.0 * i as f64 / span;
            if pass_number % 2 == 1 {
                lat
            } else {
                -lat
            }
        })
        .collect();
    let sla: Vec<f64> = (0..points)
        .map(|i| (cycle_number * 1000 + pass_number) as f64 + i as f64 / 1000.0)
        .collect();
    let swh: Vec<f64> = (0..points).map(|i| 1.0 + (i % 5) as f64 * 0.5).collect();

    let mut dataset = Dataset::new();
    let columns = [
        (
            "time",
            DataArray::new(times).with_description("Time coordinate"),
        ),
        (
            "longitude",
            DataArray::new(longitudes)
                .with_description("Longitude coordinate")
                .with_unit("degrees_east"),
        ),
        (
            "latitude",
            DataArray::new(latitudes)
                .with_description("Latitude coordinate")
                .with_unit("degrees_north"),
        ),
        (
            "cycle_number",
            DataArray::new(vec![cycle_number as i64; points]).with_description("Cycle number"),
        ),
        (
            "pass_number",
            DataArray::new(vec![pass_number as i64; points]).with_description("Pass number"),
        ),
        (
            "sla",
            DataArray::new(sla)
                .with_description("Sea level anomaly")
                .with_unit("m"),
        ),
        (
            "swh",
            DataArray::new(swh)
                .with_description("Significant wave height")
                .with_unit("m"),
        ),
    ];
    for (name, array) in columns {
        dataset
            .insert(name, array)
            .expect("generated columns share one length");
    }
    dataset
}

/// Creates consecutive half-orbits for every cycle and pass.
///
/// Half-orbits follow each other without gaps, ordered by (cycle, pass),
/// the first one starting at `start`.
pub fn create_mission(
    cycles: u32,
    passes_per_cycle: u32,
    points: usize,
    start: DateTime<Utc>,
) -> Vec<(HalfOrbit, Dataset)> {
    let half_orbit_duration = Duration::seconds(points as i64 * MEASUREMENT_STEP_SECS);
    let mut tracks = Vec::new();
    let mut t = start;
    for cycle in 1..=cycles {
        for pass in 1..=passes_per_cycle {
            tracks.push((
                HalfOrbit::new(cycle, pass),
                create_half_orbit_track(cycle, pass, t, points),
            ));
            t += half_orbit_duration;
        }
    }
    tracks
}

/// Creates the three-point dataset used by facade tests.
///
/// Points sit at longitudes {-80, 0, 80} and latitudes {-40, 0, 40}, spread
/// over 2020-01-01, with variables `a` and `b` besides the coordinates.
pub fn create_simple_dataset() -> Dataset {
    let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let times = vec![t0, t0 + Duration::hours(12), t0 + Duration::hours(24)];

    Dataset::new()
        .with("time", DataArray::new(times).with_description("Time coordinate"))
        .and_then(|d| {
            d.with(
                "longitude",
                DataArray::new(vec![-80.0, 0.0, 80.0]).with_description("Longitude coordinate"),
            )
        })
        .and_then(|d| {
            d.with(
                "latitude",
                DataArray::new(vec![-40.0, 0.0, 40.0]).with_description("Latitude coordinate"),
            )
        })
        .and_then(|d| d.with("a", DataArray::new(vec![1.0, 2.0, 3.0]).with_description("Variable a")))
        .and_then(|d| d.with("b", DataArray::new(vec![4.0, 5.0, 6.0]).with_description("Variable b")))
        .expect("simple dataset columns share one length")
}

/// Creates a float column with NaN at the given indices.
pub fn create_values_with_nans(len: usize, nan_indices: &[usize]) -> ArrayValues {
    let values: Vec<f64> = (0..len)
        .map(|i| if nan_indices.contains(&i) { f64::NAN } else { i as f64 })
        .collect();
    ArrayValues::from(values)
}

fn wrap(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::time::epoch;

    #[test]
    fn test_half_orbit_track_values() {
        let track = create_half_orbit_track(2, 5, epoch(), 11);
        assert_eq!(track.len(), 11);
        assert_eq!(track.float("sla").unwrap()[0], 2005.0);
        assert_eq!(track.int("cycle_number").unwrap()[10], 2);
        assert_eq!(track.int("pass_number").unwrap()[10], 5);

        // Odd pass ascends
        let lat = track.float("latitude").unwrap();
        assert_eq!(lat[0], -60.0);
        assert_eq!(lat[10], 60.0);

        let lon = track.float("longitude").unwrap();
        assert!(lon.iter().all(|l| (-180.0..180.0).contains(l)));
    }

    #[test]
    fn test_even_pass_descends() {
        let track = create_half_orbit_track(1, 2, epoch(), 3);
        let lat = track.float("latitude").unwrap();
        assert_eq!(lat.to_vec(), vec![60.0, -0.0, -60.0]);
    }

    #[test]
    fn test_mission_is_contiguous() {
        let mission = create_mission(2, 3, 4, epoch());
        assert_eq!(mission.len(), 6);
        assert_eq!(mission[0].0, HalfOrbit::new(1, 1));
        assert_eq!(mission[5].0, HalfOrbit::new(2, 3));

        for pair in mission.windows(2) {
            let prev_end = pair[0].1.time_extent("time").unwrap().unwrap().end;
            let next_start = pair[1].1.time_extent("time").unwrap().unwrap().start;
            assert_eq!(next_start - prev_end, Duration::seconds(MEASUREMENT_STEP_SECS));
        }
    }

    #[test]
    fn test_simple_dataset() {
        let data = create_simple_dataset();
        assert_eq!(data.len(), 3);
        assert_eq!(data.num_variables(), 5);
    }

    #[test]
    fn test_values_with_nans() {
        match create_values_with_nans(4, &[1]) {
            ArrayValues::Float(values) => {
                assert!(values[1].is_nan());
                assert_eq!(values[2], 2.0);
            }
            other => panic!("unexpected kind {}", other.kind()),
        }
    }
}
