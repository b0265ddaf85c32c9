//! Query types for altimetry sources.
//!
//! This module provides a fluent builder API for describing what to fetch.
//!
//! # Examples
//!
//! ```rust
//! use alti_io::{OrbitQuery, QueryOptions};
//!
//! // Sea level anomaly over two passes of cycle 12, one dataset per pass
//! let query = OrbitQuery::cycle(12)
//!     .passes([3, 4])
//!     .with_options(QueryOptions::new().with_variables(["sla"]))
//!     .split();
//!
//! assert_eq!(query.groups().len(), 2);
//! ```

use alti_common::{AltiError, AltiResult, Dataset, PolygonLike};
use serde_json::Value;

/// Free-form options interpreted by the backend of a source.
pub type BackendOptions = serde_json::Map<String, Value>;

/// Options shared by date and orbit queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Variables to return. `None` means all of them. Coordinates are always kept.
    pub variables: Option<Vec<String>>,

    /// Spatial selection applied after the fetch.
    pub polygon: Option<PolygonLike>,

    /// Backend-specific options.
    pub backend_kwargs: Option<BackendOptions>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict results to the given polygon.
    pub fn within(mut self, polygon: impl Into<PolygonLike>) -> Self {
        self.polygon = Some(polygon.into());
        self
    }

    /// Set one backend option.
    pub fn with_backend_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.backend_kwargs
            .get_or_insert_with(BackendOptions::new)
            .insert(key.into(), value.into());
        self
    }

    /// Decode backend options into a typed struct, defaulting when none are given.
    pub fn backend<T>(&self) -> AltiResult<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match &self.backend_kwargs {
            None => Ok(T::default()),
            Some(map) => serde_json::from_value(Value::Object(map.clone()))
                .map_err(|e| AltiError::Backend(format!("invalid backend options: {}", e))),
        }
    }
}

/// A query by orbit identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitQuery {
    /// Requested cycle numbers, in request order.
    pub cycle_numbers: Vec<u32>,

    /// Requested pass numbers. `None` selects every pass of each cycle.
    pub pass_numbers: Option<Vec<u32>>,

    pub options: QueryOptions,

    /// Merge results into one dataset (true) or return one per group (false).
    pub concat: bool,
}

/// One unit of an orbit query's split output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitGroup {
    pub cycle_number: u32,
    /// `None` when the query did not name passes.
    pub pass_number: Option<u32>,
}

impl OrbitQuery {
    /// Query a single cycle.
    pub fn cycle(cycle_number: u32) -> Self {
        Self::cycles([cycle_number])
    }

    /// Query several cycles.
    pub fn cycles(cycle_numbers: impl IntoIterator<Item = u32>) -> Self {
        Self {
            cycle_numbers: cycle_numbers.into_iter().collect(),
            pass_numbers: None,
            options: QueryOptions::default(),
            concat: true,
        }
    }

    pub fn pass(self, pass_number: u32) -> Self {
        self.passes([pass_number])
    }

    pub fn passes(mut self, pass_numbers: impl IntoIterator<Item = u32>) -> Self {
        self.pass_numbers = Some(pass_numbers.into_iter().collect());
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Return one dataset per cycle (or per cycle/pass) instead of a merged one.
    pub fn split(mut self) -> Self {
        self.concat = false;
        self
    }

    /// Groups in request order: each cycle, or each (cycle, pass) combination.
    pub fn groups(&self) -> Vec<OrbitGroup> {
        match &self.pass_numbers {
            None => self
                .cycle_numbers
                .iter()
                .map(|&cycle_number| OrbitGroup {
                    cycle_number,
                    pass_number: None,
                })
                .collect(),
            Some(passes) => self
                .cycle_numbers
                .iter()
                .flat_map(|&cycle_number| {
                    passes.iter().map(move |&pass| OrbitGroup {
                        cycle_number,
                        pass_number: Some(pass),
                    })
                })
                .collect(),
        }
    }

    pub fn validate(&self) -> AltiResult<()> {
        if self.cycle_numbers.is_empty() {
            return Err(AltiError::InvalidHalfOrbit(
                "at least one cycle number is required".to_string(),
            ));
        }
        if matches!(&self.pass_numbers, Some(p) if p.is_empty()) {
            return Err(AltiError::InvalidHalfOrbit(
                "pass number list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl OrbitGroup {
    pub fn matches(&self, cycle_number: u32, pass_number: u32) -> bool {
        self.cycle_number == cycle_number && self.pass_number.map_or(true, |p| p == pass_number)
    }
}

/// Result of a multi-part query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// All parts concatenated in request order.
    Merged(Dataset),
    /// One dataset per requested part, parallel to the request.
    Split(Vec<Dataset>),
}

impl QueryOutput {
    /// Build the output for `parts`, concatenating when requested.
    pub fn assemble(parts: Vec<Dataset>, concat: bool) -> AltiResult<Self> {
        if concat {
            Ok(QueryOutput::Merged(Dataset::concat(parts)?))
        } else {
            Ok(QueryOutput::Split(parts))
        }
    }

    /// The merged dataset, concatenating split parts if needed.
    pub fn into_merged(self) -> AltiResult<Dataset> {
        match self {
            QueryOutput::Merged(dataset) => Ok(dataset),
            QueryOutput::Split(parts) => Dataset::concat(parts),
        }
    }

    /// The parts; a merged output is a single part.
    pub fn into_split(self) -> Vec<Dataset> {
        match self {
            QueryOutput::Merged(dataset) => vec![dataset],
            QueryOutput::Split(parts) => parts,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, QueryOutput::Split(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alti_common::ArrayValues;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Opts {
        #[serde(default)]
        strict: bool,
    }

    #[test]
    fn test_groups_without_passes() {
        let query = OrbitQuery::cycles([3, 1]);
        let groups = query.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].cycle_number, 3);
        assert!(groups[0].pass_number.is_none());
        assert!(groups[0].matches(3, 99));
        assert!(!groups[0].matches(1, 99));
    }

    #[test]
    fn test_groups_with_passes() {
        let groups = OrbitQuery::cycles([1, 2]).passes([10, 11]).groups();
        let pairs: Vec<_> = groups
            .iter()
            .map(|g| (g.cycle_number, g.pass_number.unwrap()))
            .collect();
        assert_eq!(pairs, vec![(1, 10), (1, 11), (2, 10), (2, 11)]);
    }

    #[test]
    fn test_validate() {
        assert!(OrbitQuery::cycle(1).validate().is_ok());
        assert!(OrbitQuery::cycles([]).validate().is_err());
        assert!(OrbitQuery::cycle(1).passes([]).validate().is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let query = OrbitQuery::cycle(3).pass(1);
        assert!(query.concat);
        assert_eq!(query.pass_numbers, Some(vec![1]));
        assert!(!query.split().concat);
    }

    #[test]
    fn test_backend_options_decode() {
        let none = QueryOptions::new();
        assert_eq!(none.backend::<Opts>().unwrap(), Opts::default());

        let opts = QueryOptions::new().with_backend_option("strict", true);
        assert!(opts.backend::<Opts>().unwrap().strict);

        let bad = QueryOptions::new().with_backend_option("unknown", 1);
        assert!(matches!(bad.backend::<Opts>(), Err(AltiError::Backend(_))));
    }

    #[test]
    fn test_output_assemble() {
        let a = Dataset::new()
            .with("x", ArrayValues::from(vec![1.0]))
            .unwrap();
        let b = Dataset::new()
            .with("x", ArrayValues::from(vec![2.0]))
            .unwrap();

        let merged = QueryOutput::assemble(vec![a.clone(), b.clone()], true).unwrap();
        assert!(!merged.is_split());
        assert_eq!(merged.into_merged().unwrap().len(), 2);

        let split = QueryOutput::assemble(vec![a.clone(), b], false).unwrap();
        assert!(split.is_split());
        assert_eq!(split.clone().into_split().len(), 2);
        assert_eq!(split.into_merged().unwrap().len(), 2);
    }
}
