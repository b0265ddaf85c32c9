//! In-memory along-track tables.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use std::path::Path;

use alti_common::{AltiResult, Dataset, HalfOrbit, HalfOrbitPeriod, HalfOrbitTable, Period};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::query::OrbitGroup;

/// Names of the cycle and pass columns of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitColumns {
    pub cycle: String,
    pub pass: String,
}

impl Default for OrbitColumns {
    fn default() -> Self {
        Self {
            cycle: "cycle_number".to_string(),
            pass: "pass_number".to_string(),
        }
    }
}

/// A dataset kept sorted by time for range lookups.
#[derive(Debug, Clone)]
pub struct Table {
    data: Dataset,
    times: Vec<DateTime<Utc>>,
}

impl Table {
    /// Build a table, sorting records by `time_name`.
    pub fn new(data: Dataset, time_name: &str) -> AltiResult<Self> {
        let data = data.sort_by_time(time_name)?;
        let times = data.time(time_name)?.to_vec();
        Ok(Self { data, times })
    }

    /// Load a JSON dataset file.
    pub fn load(path: impl AsRef<Path>, time_name: &str) -> AltiResult<Self> {
        let path = path.as_ref();
        let data: Dataset = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let table = Self::new(data, time_name)?;
        info!(path = %path.display(), records = table.len(), "Loaded table");
        Ok(table)
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn period(&self) -> Option<Period> {
        Some(Period::new(*self.times.first()?, *self.times.last()?))
    }

    /// Row range whose times fall in the closed period.
    pub fn rows_in(&self, period: &Period) -> Range<usize> {
        let start = self.times.partition_point(|t| *t < period.start);
        let end = self.times.partition_point(|t| *t <= period.end);
        start..end.max(start)
    }

    /// Records in the closed period.
    pub fn slice_period(&self, period: &Period) -> Dataset {
        self.data.slice(self.rows_in(period))
    }

    /// Records of one orbit group.
    pub fn select_orbit(&self, group: &OrbitGroup, columns: &OrbitColumns) -> AltiResult<Dataset> {
        let cycles = self.data.int(&columns.cycle)?;
        let passes = self.data.int(&columns.pass)?;
        let mask: Vec<bool> = cycles
            .iter()
            .zip(passes.iter())
            .map(|(&c, &p)| {
                u32::try_from(c).is_ok_and(|c| u32::try_from(p).is_ok_and(|p| group.matches(c, p)))
            })
            .collect();
        self.data.filter(&mask)
    }

    /// Coverage of every (cycle, pass) present in the table.
    pub fn half_orbit_periods(&self, columns: &OrbitColumns) -> AltiResult<HalfOrbitTable> {
        let cycles = self.data.int(&columns.cycle)?;
        let passes = self.data.int(&columns.pass)?;

        let mut merged: BTreeMap<HalfOrbit, Period> = BTreeMap::new();
        for ((&cycle, &pass), &time) in cycles.iter().zip(passes.iter()).zip(self.times.iter()) {
            let (Ok(cycle), Ok(pass)) = (u32::try_from(cycle), u32::try_from(pass)) else {
                continue;
            };
            merged
                .entry(HalfOrbit::new(cycle, pass))
                .and_modify(|p| *p = p.union(&Period::new(time, time)))
                .or_insert(Period::new(time, time));
        }

        Ok(HalfOrbitTable::new(
            merged
                .into_iter()
                .map(|(key, period)| HalfOrbitPeriod {
                    cycle_number: key.cycle_number,
                    pass_number: key.pass_number,
                    first_measurement_time: period.start,
                    last_measurement_time: period.end,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alti_common::ArrayValues;
    use chrono::{Duration, TimeZone};

    fn t(sec: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(sec)
    }

    fn table() -> Table {
        // Deliberately unsorted input
        let data = Dataset::new()
            .with("time", ArrayValues::from(vec![t(30), t(0), t(10), t(20)]))
            .unwrap()
            .with("cycle_number", ArrayValues::from(vec![2_i64, 1, 1, 2]))
            .unwrap()
            .with("pass_number", ArrayValues::from(vec![1_i64, 1, 2, 1]))
            .unwrap()
            .with("sla", ArrayValues::from(vec![3.0, 0.0, 1.0, 2.0]))
            .unwrap();
        Table::new(data, "time").unwrap()
    }

    #[test]
    fn test_sorted_on_build() {
        let table = table();
        assert_eq!(table.data().float("sla").unwrap().to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(table.period(), Some(Period::new(t(0), t(30))));
    }

    #[test]
    fn test_rows_in_is_inclusive() {
        let table = table();
        assert_eq!(table.rows_in(&Period::new(t(10), t(20))), 1..3);
        assert_eq!(table.rows_in(&Period::new(t(5), t(9))), 1..1);
        assert_eq!(table.rows_in(&Period::new(t(100), t(200))), 4..4);
        assert_eq!(table.slice_period(&Period::new(t(0), t(30))).len(), 4);
    }

    #[test]
    fn test_select_orbit() {
        let table = table();
        let columns = OrbitColumns::default();
        let group = OrbitGroup {
            cycle_number: 2,
            pass_number: None,
        };
        let data = table.select_orbit(&group, &columns).unwrap();
        assert_eq!(data.float("sla").unwrap().to_vec(), vec![2.0, 3.0]);

        let group = OrbitGroup {
            cycle_number: 1,
            pass_number: Some(2),
        };
        let data = table.select_orbit(&group, &columns).unwrap();
        assert_eq!(data.float("sla").unwrap().to_vec(), vec![1.0]);
    }

    #[test]
    fn test_half_orbit_periods() {
        let periods = table().half_orbit_periods(&OrbitColumns::default()).unwrap();
        assert_eq!(periods.len(), 3);
        let row = periods.find(HalfOrbit::new(2, 1)).unwrap();
        assert_eq!(row.first_measurement_time, t(20));
        assert_eq!(row.last_measurement_time, t(30));
    }

    #[test]
    fn test_missing_orbit_columns() {
        let columns = OrbitColumns {
            cycle: "cycle".to_string(),
            pass: "pass".to_string(),
        };
        assert!(table().half_orbit_periods(&columns).is_err());
    }
}
