//! Time periods for along-track queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AltiError, AltiResult};

/// A closed time interval `[start, end]`.
///
/// Construction through [`Period::new`] does not check the ordering so that a
/// backend's extent can be passed through unmodified. Use [`Period::checked`]
/// or [`Period::validate`] before querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Create a period, rejecting `start > end`.
    pub fn checked(start: DateTime<Utc>, end: DateTime<Utc>) -> AltiResult<Self> {
        let period = Self::new(start, end);
        period.validate()?;
        Ok(period)
    }

    pub fn validate(&self) -> AltiResult<()> {
        if self.start > self.end {
            return Err(AltiError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Parse a `start/end` pair of ISO 8601 times.
    pub fn parse(s: &str) -> AltiResult<Self> {
        let (start, end) = s.split_once('/').ok_or_else(|| {
            AltiError::InvalidTime(format!("expected 'start/end', got '{}'", s))
        })?;
        Self::checked(parse_datetime(start.trim())?, parse_datetime(end.trim())?)
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    /// Check if two closed intervals share at least one instant.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Smallest period covering both.
    pub fn union(&self, other: &Period) -> Period {
        Period::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<(DateTime<Utc>, DateTime<Utc>)> for Period {
    fn from((start, end): (DateTime<Utc>, DateTime<Utc>)) -> Self {
        Self::new(start, end)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// One period or an ordered list of periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Periods {
    Single(Period),
    Many(Vec<Period>),
}

impl Periods {
    pub fn as_slice(&self) -> &[Period] {
        match self {
            Periods::Single(period) => std::slice::from_ref(period),
            Periods::Many(periods) => periods,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Validate every period, failing on the first inverted one.
    pub fn validate(&self) -> AltiResult<()> {
        self.as_slice().iter().try_for_each(Period::validate)
    }
}

impl From<Period> for Periods {
    fn from(period: Period) -> Self {
        Periods::Single(period)
    }
}

impl From<(DateTime<Utc>, DateTime<Utc>)> for Periods {
    fn from(pair: (DateTime<Utc>, DateTime<Utc>)) -> Self {
        Periods::Single(pair.into())
    }
}

impl From<Vec<Period>> for Periods {
    fn from(periods: Vec<Period>) -> Self {
        Periods::Many(periods)
    }
}

impl From<Vec<(DateTime<Utc>, DateTime<Utc>)>> for Periods {
    fn from(pairs: Vec<(DateTime<Utc>, DateTime<Utc>)>) -> Self {
        Periods::Many(pairs.into_iter().map(Period::from).collect())
    }
}

/// Parse an ISO 8601 time, assuming UTC when no offset is given.
///
/// Accepts RFC 3339, `%Y-%m-%dT%H:%M:%S[.f]` and bare dates.
pub fn parse_datetime(s: &str) -> AltiResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(AltiError::InvalidTime(s.to_string()))
}

/// Compact timestamp used in half-orbit file names: `YYYYmmddTHHMMSS`.
pub fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
        .ok()
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

pub fn format_compact(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}
