//! Source backed by an in-memory table.

use std::path::Path;
use std::sync::Arc;

use alti_common::{
    AltiError, AltiResult, CoordinateNames, Dataset, HalfOrbit, HalfOrbitTable, Period,
    VariableMap,
};
use serde::Deserialize;
use tracing::debug;

use super::{finalize, AltimetrySource};
use crate::query::{OrbitQuery, QueryOptions, QueryOutput};
use crate::table::{OrbitColumns, Table};

/// Tables take no backend options.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableOptions {}

/// Altimetry source reading a time-sorted [`Table`].
#[derive(Debug, Clone)]
pub struct TableSource {
    coordinates: CoordinateNames,
    orbit_columns: OrbitColumns,
    table: Arc<Table>,
}

impl TableSource {
    pub fn new(table: Arc<Table>, coordinates: CoordinateNames) -> Self {
        Self {
            coordinates,
            orbit_columns: OrbitColumns::default(),
            table,
        }
    }

    /// Load a JSON table file.
    pub fn open(path: impl AsRef<Path>, coordinates: CoordinateNames) -> AltiResult<Self> {
        let table = Table::load(path, &coordinates.time)?;
        Ok(Self::new(Arc::new(table), coordinates))
    }

    pub fn with_orbit_columns(mut self, orbit_columns: OrbitColumns) -> Self {
        self.orbit_columns = orbit_columns;
        self
    }

    pub fn orbit_columns(&self) -> &OrbitColumns {
        &self.orbit_columns
    }
}

impl AltimetrySource for TableSource {
    type Handler = Table;

    fn coordinates(&self) -> &CoordinateNames {
        &self.coordinates
    }

    fn handler(&self) -> &Table {
        &self.table
    }

    fn variables(&self) -> AltiResult<VariableMap> {
        Ok(self.table.data().variables())
    }

    fn period(&self) -> AltiResult<Period> {
        self.table
            .period()
            .ok_or_else(|| AltiError::Collection("table has no records".to_string()))
    }

    fn half_orbit_periods(
        &self,
        half_orbit_min: Option<HalfOrbit>,
        half_orbit_max: Option<HalfOrbit>,
    ) -> AltiResult<HalfOrbitTable> {
        self.table
            .half_orbit_periods(&self.orbit_columns)?
            .bounded(half_orbit_min, half_orbit_max)
    }

    fn query_date(&self, period: &Period, options: &QueryOptions) -> AltiResult<Dataset> {
        period.validate()?;
        options.backend::<TableOptions>()?;

        let rows = self.table.rows_in(period);
        debug!(%period, records = rows.len(), "Date query");

        let data = self.table.data().slice(rows);
        finalize(data, options, &self.coordinates, &self.variables()?)
    }

    fn query_orbit(&self, query: &OrbitQuery) -> AltiResult<QueryOutput> {
        query.validate()?;
        query.options.backend::<TableOptions>()?;
        let variables = self.variables()?;

        let mut parts = Vec::new();
        for group in query.groups() {
            let data = self.table.select_orbit(&group, &self.orbit_columns)?;
            debug!(
                cycle = group.cycle_number,
                pass = ?group.pass_number,
                records = data.len(),
                "Orbit query"
            );
            parts.push(finalize(data, &query.options, &self.coordinates, &variables)?);
        }

        QueryOutput::assemble(parts, query.concat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alti_common::ArrayValues;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(sec: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(sec)
    }

    fn source() -> TableSource {
        let data = Dataset::new()
            .with("time", ArrayValues::from(vec![t(0), t(10), t(20), t(30)]))
            .unwrap()
            .with("longitude", ArrayValues::from(vec![0.0, 1.0, 2.0, 3.0]))
            .unwrap()
            .with("latitude", ArrayValues::from(vec![0.0, 1.0, 2.0, 3.0]))
            .unwrap()
            .with("cycle_number", ArrayValues::from(vec![1_i64, 1, 2, 2]))
            .unwrap()
            .with("pass_number", ArrayValues::from(vec![1_i64, 2, 1, 2]))
            .unwrap()
            .with("sla", ArrayValues::from(vec![0.1, 0.2, 0.3, 0.4]))
            .unwrap();
        let table = Table::new(data, "time").unwrap();
        TableSource::new(Arc::new(table), CoordinateNames::default())
    }

    #[test]
    fn test_period() {
        assert_eq!(source().period().unwrap(), Period::new(t(0), t(30)));
    }

    #[test]
    fn test_query_date_bounds_inclusive() {
        let data = source()
            .query_date(&Period::new(t(10), t(20)), &QueryOptions::new())
            .unwrap();
        assert_eq!(data.float("sla").unwrap().to_vec(), vec![0.2, 0.3]);
    }

    #[test]
    fn test_query_date_outside_is_empty() {
        let data = source()
            .query_date(&Period::new(t(100), t(200)), &QueryOptions::new())
            .unwrap();
        assert!(data.is_empty());
        assert!(data.contains("sla"));
    }

    #[test]
    fn test_query_date_rejects_backend_options() {
        let options = QueryOptions::new().with_backend_option("skip_unreadable", true);
        let result = source().query_date(&Period::new(t(0), t(30)), &options);
        assert!(matches!(result, Err(AltiError::Backend(_))));
    }

    #[test]
    fn test_query_orbit_split() {
        let query = OrbitQuery::cycles([2, 1]).pass(1).split();
        let parts = source().query_orbit(&query).unwrap().into_split();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].float("sla").unwrap().to_vec(), vec![0.3]);
        assert_eq!(parts[1].float("sla").unwrap().to_vec(), vec![0.1]);
    }

    #[test]
    fn test_half_orbit_bounds() {
        let table = source()
            .half_orbit_periods(Some(HalfOrbit::new(1, 2)), Some(HalfOrbit::new(2, 1)))
            .unwrap();
        let keys: Vec<_> = table.iter().map(|r| r.half_orbit()).collect();
        assert_eq!(keys, vec![HalfOrbit::new(1, 2), HalfOrbit::new(2, 1)]);
    }
}
