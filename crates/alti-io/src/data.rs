//! Data access facade.
//!
//! [`AltimetryData`] wraps any [`AltimetrySource`] and exposes a uniform
//! query interface over it. Every operation delegates to the source; the
//! facade only adds period validation and variable listing.

use std::fmt;

use alti_common::{
    AltiResult, Dataset, HalfOrbit, HalfOrbitTable, Period, Periods, PolygonLike, Variable,
    VariableMap,
};
use tracing::debug;

use crate::query::{OrbitQuery, QueryOptions, QueryOutput};
use crate::source::AltimetrySource;

/// Uniform access to an altimetry source.
#[derive(Debug, Clone)]
pub struct AltimetryData<S> {
    source: S,
}

impl<S: AltimetrySource> AltimetryData<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Backend resource of the wrapped source.
    pub fn handler(&self) -> &S::Handler {
        self.source.handler()
    }

    pub fn variables(&self) -> AltiResult<VariableMap> {
        self.source.variables()
    }

    /// List variables, optionally those whose name or description contains
    /// `containing` (case-insensitive).
    pub fn show_variables(&self, containing: Option<&str>) -> AltiResult<VariableTable> {
        let rows = self
            .source
            .variables()?
            .into_values()
            .filter(|v| containing.map_or(true, |needle| v.matches(needle)))
            .collect();
        Ok(VariableTable { rows })
    }

    pub fn period(&self) -> AltiResult<Period> {
        self.source.period()
    }

    pub fn half_orbit_periods(
        &self,
        half_orbit_min: Option<HalfOrbit>,
        half_orbit_max: Option<HalfOrbit>,
    ) -> AltiResult<HalfOrbitTable> {
        self.source.half_orbit_periods(half_orbit_min, half_orbit_max)
    }

    /// Query one or several periods.
    ///
    /// # Arguments
    /// * `periods` - A single period or a list of periods
    /// * `options` - Variable selection, polygon and backend options
    /// * `concat` - Merge the per-period results (true) or return them as a
    ///   list parallel to `periods` (false)
    pub fn query(
        &self,
        periods: impl Into<Periods>,
        options: &QueryOptions,
        concat: bool,
    ) -> AltiResult<QueryOutput> {
        let periods = periods.into();
        periods.validate()?;
        debug!(periods = periods.len(), concat, "Query");
        self.source.query(&periods, options, concat)
    }

    pub fn query_orbit(&self, query: &OrbitQuery) -> AltiResult<QueryOutput> {
        self.source.query_orbit(query)
    }

    pub fn restrict_to_polygon(&self, data: Dataset, polygon: &PolygonLike) -> AltiResult<Dataset> {
        self.source.restrict_to_polygon(data, polygon)
    }
}

/// Variables listed by [`AltimetryData::show_variables`], ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    rows: Vec<Variable>,
}

impl VariableTable {
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|v| v.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a VariableTable {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for VariableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEADERS: [&str; 3] = ["name", "description", "unit"];

        let cells: Vec<[&str; 3]> = self
            .rows
            .iter()
            .map(|v| {
                [
                    v.name.as_str(),
                    v.description.as_deref().unwrap_or(""),
                    v.unit.as_deref().unwrap_or(""),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for row in std::iter::once(&HEADERS).chain(&cells) {
            writeln!(
                f,
                "{:<w0$}  {:<w1$}  {}",
                row[0],
                row[1],
                row[2],
                w0 = widths[0],
                w1 = widths[1]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VariableTable {
        VariableTable {
            rows: vec![
                Variable::new("sla")
                    .with_description("Sea level anomaly")
                    .with_unit("m"),
                Variable::new("time").with_description("Time coordinate"),
            ],
        }
    }

    #[test]
    fn test_table_display_is_aligned() {
        let text = table().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name  description"));
        assert_eq!(lines[1].trim_end(), "sla   Sea level anomaly  m");
        assert_eq!(lines[2].trim_end(), "time  Time coordinate");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(table().names().collect::<Vec<_>>(), vec!["sla", "time"]);
        assert_eq!(table().len(), 2);
        assert!(VariableTable::default().is_empty());
    }
}
