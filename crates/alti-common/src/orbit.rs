//! Half-orbit identifiers and period tables.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AltiError, AltiResult};
use crate::time::{format_compact, Period};

/// Extension of half-orbit files.
pub const HALF_ORBIT_FILE_EXTENSION: &str = "json";

/// One ascending or descending segment of a ground track.
///
/// Ordering is lexicographic on (cycle, pass).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HalfOrbit {
    pub cycle_number: u32,
    pub pass_number: u32,
}

impl HalfOrbit {
    pub fn new(cycle_number: u32, pass_number: u32) -> Self {
        Self {
            cycle_number,
            pass_number,
        }
    }

    /// File name of this half-orbit in a collection:
    /// `<prefix>_<cycle>_<pass>_<first time>_<last time>.json`.
    pub fn file_name(&self, prefix: &str, period: &Period) -> String {
        format!(
            "{}_{:03}_{:03}_{}_{}.{}",
            prefix,
            self.cycle_number,
            self.pass_number,
            format_compact(&period.start),
            format_compact(&period.end),
            HALF_ORBIT_FILE_EXTENSION
        )
    }
}

impl FromStr for HalfOrbit {
    type Err = AltiError;

    /// Parse `CYCLE:PASS`, e.g. `12:345`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cycle, pass) = s
            .split_once(':')
            .ok_or_else(|| AltiError::InvalidHalfOrbit(format!("expected 'CYCLE:PASS', got '{}'", s)))?;

        let cycle_number = cycle
            .trim()
            .parse()
            .map_err(|_| AltiError::InvalidHalfOrbit(format!("invalid cycle number '{}'", cycle)))?;
        let pass_number = pass
            .trim()
            .parse()
            .map_err(|_| AltiError::InvalidHalfOrbit(format!("invalid pass number '{}'", pass)))?;

        Ok(Self::new(cycle_number, pass_number))
    }
}

impl std::fmt::Display for HalfOrbit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.cycle_number, self.pass_number)
    }
}

/// Time coverage of one half-orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfOrbitPeriod {
    pub cycle_number: u32,
    pub pass_number: u32,
    pub first_measurement_time: DateTime<Utc>,
    pub last_measurement_time: DateTime<Utc>,
}

impl HalfOrbitPeriod {
    pub fn half_orbit(&self) -> HalfOrbit {
        HalfOrbit::new(self.cycle_number, self.pass_number)
    }

    pub fn period(&self) -> Period {
        Period::new(self.first_measurement_time, self.last_measurement_time)
    }
}

/// Half-orbit periods ordered by (cycle, pass).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HalfOrbitTable {
    rows: Vec<HalfOrbitPeriod>,
}

impl HalfOrbitTable {
    /// Build a table, sorting rows by (cycle, pass).
    pub fn new(mut rows: Vec<HalfOrbitPeriod>) -> Self {
        rows.sort_by_key(HalfOrbitPeriod::half_orbit);
        Self { rows }
    }

    /// Keep rows between `min` and `max`, both inclusive.
    pub fn bounded(&self, min: Option<HalfOrbit>, max: Option<HalfOrbit>) -> AltiResult<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(AltiError::InvalidHalfOrbit(format!(
                    "lower bound {} is after upper bound {}",
                    lo, hi
                )));
            }
        }

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let key = row.half_orbit();
                min.map_or(true, |lo| key >= lo) && max.map_or(true, |hi| key <= hi)
            })
            .copied()
            .collect();

        Ok(Self { rows })
    }

    pub fn find(&self, half_orbit: HalfOrbit) -> Option<&HalfOrbitPeriod> {
        self.rows
            .binary_search_by_key(&half_orbit, HalfOrbitPeriod::half_orbit)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Full coverage of the table.
    pub fn period(&self) -> Option<Period> {
        let start = self.rows.iter().map(|r| r.first_measurement_time).min()?;
        let end = self.rows.iter().map(|r| r.last_measurement_time).max()?;
        Some(Period::new(start, end))
    }

    pub fn rows(&self) -> &[HalfOrbitPeriod] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HalfOrbitPeriod> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a HalfOrbitTable {
    type Item = &'a HalfOrbitPeriod;
    type IntoIter = std::slice::Iter<'a, HalfOrbitPeriod>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
