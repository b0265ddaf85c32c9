//! Altimetry source trait and implementations.

mod catalog;
mod file_collection;
mod table;

pub use catalog::{CatalogBackend, CatalogSource};
pub use file_collection::{FileCollectionSource, FileReadOptions};
pub use table::TableSource;

use alti_common::{
    AltiError, AltiResult, CoordinateNames, Dataset, HalfOrbit, HalfOrbitTable, Period, Periods,
    PolygonLike, VariableMap,
};
use tracing::debug;

use crate::query::{OrbitQuery, QueryOptions, QueryOutput};

/// Trait for accessing along-track altimetry data.
///
/// This trait abstracts over different backends (file collections, tables,
/// catalogs). Every variant resolves its data through a handler it shares
/// with its callers and answers date and orbit queries with [`Dataset`]s.
pub trait AltimetrySource {
    /// Backend resource the source reads from.
    type Handler;

    /// Names of the time, longitude and latitude variables.
    fn coordinates(&self) -> &CoordinateNames;

    /// The backend resource, for advanced use.
    fn handler(&self) -> &Self::Handler;

    /// Every variable the source can return, keyed by name.
    fn variables(&self) -> AltiResult<VariableMap>;

    /// Full temporal extent of the source.
    fn period(&self) -> AltiResult<Period>;

    /// Half-orbit periods ordered by (cycle, pass).
    ///
    /// # Arguments
    /// * `half_orbit_min` - Lowest half-orbit to include (inclusive)
    /// * `half_orbit_max` - Highest half-orbit to include (inclusive)
    fn half_orbit_periods(
        &self,
        half_orbit_min: Option<HalfOrbit>,
        half_orbit_max: Option<HalfOrbit>,
    ) -> AltiResult<HalfOrbitTable>;

    /// All records whose time falls in the closed period.
    ///
    /// A period outside the source's extent yields an empty dataset.
    fn query_date(&self, period: &Period, options: &QueryOptions) -> AltiResult<Dataset>;

    /// Records of the requested cycles and passes.
    fn query_orbit(&self, query: &OrbitQuery) -> AltiResult<QueryOutput>;

    /// Keep the records of `data` whose position lies in `polygon`.
    fn restrict_to_polygon(&self, data: Dataset, polygon: &PolygonLike) -> AltiResult<Dataset> {
        restrict_to_polygon(data, polygon, self.coordinates())
    }

    /// Query one or several periods.
    ///
    /// Results are concatenated in input order, or returned as a list
    /// parallel to the input when `concat` is false.
    fn query(
        &self,
        periods: &Periods,
        options: &QueryOptions,
        concat: bool,
    ) -> AltiResult<QueryOutput> {
        let parts = periods
            .as_slice()
            .iter()
            .map(|period| self.query_date(period, options))
            .collect::<AltiResult<Vec<_>>>()?;
        QueryOutput::assemble(parts, concat)
    }

    /// Check that the coordinate names exist among the source's variables.
    fn validate_coordinates(&self) -> AltiResult<()> {
        let variables = self.variables()?;
        for name in self.coordinates().as_array() {
            if !variables.contains_key(name) {
                return Err(AltiError::MissingCoordinate(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Keep the records whose (longitude, latitude) lie in the polygon.
pub fn restrict_to_polygon(
    data: Dataset,
    polygon: &PolygonLike,
    coordinates: &CoordinateNames,
) -> AltiResult<Dataset> {
    if data.num_variables() == 0 {
        return Ok(data);
    }

    let lons = data
        .float(&coordinates.longitude)
        .map_err(|_| AltiError::MissingCoordinate(coordinates.longitude.clone()))?;
    let lats = data
        .float(&coordinates.latitude)
        .map_err(|_| AltiError::MissingCoordinate(coordinates.latitude.clone()))?;

    let mask = polygon.mask(lons.iter(), lats.iter());
    let restricted = data.filter(&mask)?;
    debug!(
        before = data.len(),
        after = restricted.len(),
        "Restricted dataset to polygon"
    );
    Ok(restricted)
}

/// Apply the polygon and variable selection of `options` to fetched data.
///
/// Coordinates are always kept. Requested names unknown to `variables` are
/// an error even when `data` is empty.
pub(crate) fn finalize(
    data: Dataset,
    options: &QueryOptions,
    coordinates: &CoordinateNames,
    variables: &VariableMap,
) -> AltiResult<Dataset> {
    let selection = match &options.variables {
        Some(requested) => {
            if let Some(unknown) = requested.iter().find(|v| !variables.contains_key(v.as_str())) {
                return Err(AltiError::UnknownVariable(unknown.clone()));
            }
            let mut names: Vec<&str> = coordinates.as_array().to_vec();
            names.extend(
                requested
                    .iter()
                    .map(String::as_str)
                    .filter(|v| !coordinates.contains(v)),
            );
            Some(names)
        }
        None => None,
    };

    let data = match &options.polygon {
        Some(polygon) => restrict_to_polygon(data, polygon, coordinates)?,
        None => data,
    };

    match selection {
        Some(names) if data.num_variables() > 0 => data.select(&names),
        _ => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alti_common::ArrayValues;
    use chrono::{TimeZone, Utc};

    fn track() -> Dataset {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Dataset::new()
            .with(
                "time",
                ArrayValues::from(vec![t0, t0 + chrono::Duration::seconds(1), t0 + chrono::Duration::seconds(2)]),
            )
            .unwrap()
            .with("longitude", ArrayValues::from(vec![-80.0, 0.0, 80.0]))
            .unwrap()
            .with("latitude", ArrayValues::from(vec![-40.0, 0.0, 40.0]))
            .unwrap()
            .with("a", ArrayValues::from(vec![1.0, 2.0, 3.0]))
            .unwrap()
            .with("b", ArrayValues::from(vec![4.0, 5.0, 6.0]))
            .unwrap()
    }

    fn variables() -> VariableMap {
        track().variables()
    }

    #[test]
    fn test_restrict_keeps_all_points_in_globe() {
        let polygon = PolygonLike::from_wkt(
            "POLYGON((-180.05 -60.05, -180.05 40.05, 180.05 40.05, 180.05 -60.05, -180.05 -60.05))",
        )
        .unwrap();
        let data = restrict_to_polygon(track(), &polygon, &CoordinateNames::default()).unwrap();
        assert_eq!(data.float("longitude").unwrap().to_vec(), vec![-80.0, 0.0, 80.0]);
        assert_eq!(data.float("latitude").unwrap().to_vec(), vec![-40.0, 0.0, 40.0]);
    }

    #[test]
    fn test_restrict_disjoint_polygon_is_empty() {
        let polygon = PolygonLike::bbox(100.0, 120.0, 60.0, 70.0).unwrap();
        let data = restrict_to_polygon(track(), &polygon, &CoordinateNames::default()).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.num_variables(), 5);
    }

    #[test]
    fn test_restrict_missing_coordinate() {
        let data = track().select(&["time", "a"]).unwrap();
        let polygon = PolygonLike::bbox(-10.0, 10.0, -10.0, 10.0).unwrap();
        let result = restrict_to_polygon(data, &polygon, &CoordinateNames::default());
        assert!(matches!(result, Err(AltiError::MissingCoordinate(ref n)) if n == "longitude"));
    }

    #[test]
    fn test_finalize_selects_with_coordinates() {
        let options = QueryOptions::new().with_variables(["a"]);
        let data = finalize(track(), &options, &CoordinateNames::default(), &variables()).unwrap();
        assert_eq!(
            data.names().collect::<Vec<_>>(),
            vec!["a", "latitude", "longitude", "time"]
        );
    }

    #[test]
    fn test_finalize_unknown_variable() {
        let options = QueryOptions::new().with_variables(["zzz"]);
        let result = finalize(
            Dataset::default(),
            &options,
            &CoordinateNames::default(),
            &variables(),
        );
        assert!(matches!(result, Err(AltiError::UnknownVariable(ref n)) if n == "zzz"));
    }

    #[test]
    fn test_finalize_polygon_then_select() {
        let options = QueryOptions::new()
            .with_variables(["b"])
            .within(PolygonLike::bbox(-1.0, 1.0, -1.0, 1.0).unwrap());
        let data = finalize(track(), &options, &CoordinateNames::default(), &variables()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.float("b").unwrap().to_vec(), vec![5.0]);
        assert!(!data.contains("a"));
    }

    #[test]
    fn test_finalize_empty_data_passthrough() {
        let options = QueryOptions::new().with_variables(["a"]);
        let data = finalize(
            Dataset::default(),
            &options,
            &CoordinateNames::default(),
            &variables(),
        )
        .unwrap();
        assert_eq!(data, Dataset::default());
    }
}
