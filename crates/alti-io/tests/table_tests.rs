//! Integration tests for TableSource.

use std::sync::Arc;

use alti_common::{AltiError, CoordinateNames, Dataset, HalfOrbit};
use alti_io::{
    AltimetryData, AltimetrySource, FileCollectionSource, OrbitQuery, QueryOptions, Table,
    TableSource,
};
use test_utils::fixtures::time;
use test_utils::{
    assert_approx_eq, assert_times_within, create_mission, temp_test_dir, write_collection,
    write_json,
};

const POINTS: usize = 10;

fn mission_table() -> Dataset {
    let mut tracks: Vec<Dataset> = create_mission(2, 3, POINTS, time::epoch())
        .into_iter()
        .map(|(_, track)| track)
        .collect();
    // Tables need not be stored in time order
    tracks.reverse();
    Dataset::concat(tracks).unwrap()
}

fn source() -> TableSource {
    let table = Table::new(mission_table(), "time").unwrap();
    TableSource::new(Arc::new(table), CoordinateNames::default())
}

#[test]
fn test_open_from_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("mission.json");
    write_json(&path, &mission_table());

    let source = TableSource::open(&path, CoordinateNames::default()).unwrap();
    assert_eq!(source.handler().len(), 6 * POINTS);
    assert_eq!(source.period().unwrap(), time::between(0, 3540));
}

#[test]
fn test_open_missing_file() {
    let result = TableSource::open("/definitely/not/here.json", CoordinateNames::default());
    assert!(matches!(result, Err(AltiError::Io(_))));
}

#[test]
fn test_variables_and_coordinates() {
    let source = source();
    let variables = source.variables().unwrap();
    assert_eq!(variables.len(), 7);
    assert_eq!(variables["swh"].unit.as_deref(), Some("m"));
    assert!(source.validate_coordinates().is_ok());
}

#[test]
fn test_query_date_inclusive_bounds() {
    let period = time::between(60, 600);
    let data = source().query_date(&period, &QueryOptions::new()).unwrap();
    // 60..540 from the first half-orbit, 600 from the second
    assert_eq!(data.len(), POINTS);
    assert_times_within!(data, "time", period);

    let times = data.time("time").unwrap();
    assert!(times.iter().zip(times.iter().skip(1)).all(|(a, b)| a <= b));
}

#[test]
fn test_query_date_out_of_range() {
    let data = source()
        .query_date(&time::before_mission(), &QueryOptions::new())
        .unwrap();
    assert!(data.is_empty());
}

#[test]
fn test_query_date_reversed_period() {
    let result = source().query_date(&time::between(600, 60), &QueryOptions::new());
    assert!(matches!(result, Err(AltiError::InvalidRange { .. })));
}

#[test]
fn test_query_orbit() {
    let data = source()
        .query_orbit(&OrbitQuery::cycle(1).pass(2))
        .unwrap()
        .into_merged()
        .unwrap();
    assert_eq!(data.len(), POINTS);
    assert_approx_eq!(data.float("sla").unwrap()[0], 1002.0, 1e-9);
    assert_times_within!(data, "time", time::between(600, 1140));
}

#[test]
fn test_query_orbit_split_by_cycle() {
    let parts = source()
        .query_orbit(&OrbitQuery::cycles([2, 1]).split())
        .unwrap()
        .into_split();

    assert_eq!(parts.len(), 2);
    for (part, cycle) in parts.iter().zip([2, 1]) {
        assert_eq!(part.len(), 3 * POINTS);
        assert!(part.int("cycle_number").unwrap().iter().all(|&c| c == cycle));
        let passes = part.int("pass_number").unwrap();
        assert_eq!(passes[0], 1);
        assert_eq!(passes[3 * POINTS - 1], 3);
    }
}

#[test]
fn test_query_orbit_unknown_variable() {
    let query = OrbitQuery::cycle(1).with_options(QueryOptions::new().with_variables(["sst"]));
    let result = source().query_orbit(&query);
    assert!(matches!(result, Err(AltiError::UnknownVariable(_))));
}

#[test]
fn test_custom_orbit_columns() {
    let mut data = mission_table();
    let cycles = data.remove("cycle_number").unwrap();
    data.insert("cycle", cycles).unwrap();

    let table = Table::new(data, "time").unwrap();
    let default_columns = TableSource::new(Arc::new(table.clone()), CoordinateNames::default());
    assert!(default_columns.half_orbit_periods(None, None).is_err());

    let source = TableSource::new(Arc::new(table), CoordinateNames::default()).with_orbit_columns(
        alti_io::OrbitColumns {
            cycle: "cycle".to_string(),
            pass: "pass_number".to_string(),
        },
    );
    assert_eq!(source.half_orbit_periods(None, None).unwrap().len(), 6);
}

#[test]
fn test_half_orbits_agree_with_file_collection() {
    let dir = temp_test_dir();
    let tracks = create_mission(2, 3, POINTS, time::epoch());
    write_collection(dir.path(), "ALTI_TEST", &tracks);
    let files = FileCollectionSource::open(dir.path(), CoordinateNames::default()).unwrap();

    let table = source();
    let min = Some(HalfOrbit::new(1, 3));
    assert_eq!(
        table.half_orbit_periods(min, None).unwrap(),
        files.half_orbit_periods(min, None).unwrap()
    );

    let period = time::between(500, 2000);
    let from_table = table.query_date(&period, &QueryOptions::new()).unwrap();
    let from_files = files.query_date(&period, &QueryOptions::new()).unwrap();
    assert_eq!(from_table.time("time").unwrap(), from_files.time("time").unwrap());
    assert_eq!(
        from_table.int("pass_number").unwrap(),
        from_files.int("pass_number").unwrap()
    );
}

#[test]
fn test_facade_over_table() {
    let data = AltimetryData::new(source());
    assert_eq!(data.variables().unwrap(), data.source().variables().unwrap());

    let parts = data
        .query(
            vec![time::between(0, 59), time::between(600, 659)],
            &QueryOptions::new().with_variables(["swh"]),
            false,
        )
        .unwrap()
        .into_split();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| p.len() == 1 && !p.contains("sla")));
}
