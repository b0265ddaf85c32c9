//! Along-track datasets.
//!
//! A [`Dataset`] is a set of named one-dimensional arrays sharing a single index
//! dimension (the along-track measurement index). It is the value every query
//! returns and the on-disk unit of file collections.
//!
//! # JSON layout
//!
//! ```text
//! {
//!   "time":      {"values": {"dtype": "time",  "data": ["2020-01-01T00:00:00Z", ...]}},
//!   "longitude": {"values": {"dtype": "float", "data": [12.5, ...]}, "unit": "degrees_east"},
//!   "sla":       {"values": {"dtype": "float", "data": [0.12, null, ...]}, "unit": "m"}
//! }
//! ```
//!
//! Missing float values are written as `null` and read back as NaN.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AltiError, AltiResult};
use crate::time::Period;
use crate::variable::{Variable, VariableMap};

/// Values of one array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValues", into = "RawValues")]
pub enum ArrayValues {
    Float(Array1<f64>),
    Int(Array1<i64>),
    Time(Array1<DateTime<Utc>>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Float(a) => a.len(),
            ArrayValues::Int(a) => a.len(),
            ArrayValues::Time(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ArrayValues::Float(_) => "float",
            ArrayValues::Int(_) => "int",
            ArrayValues::Time(_) => "time",
        }
    }

    /// Gather the given indices, in order.
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            ArrayValues::Float(a) => ArrayValues::Float(a.select(Axis(0), indices)),
            ArrayValues::Int(a) => ArrayValues::Int(a.select(Axis(0), indices)),
            ArrayValues::Time(a) => ArrayValues::Time(a.select(Axis(0), indices)),
        }
    }

    pub fn slice(&self, range: Range<usize>) -> Self {
        match self {
            ArrayValues::Float(a) => ArrayValues::Float(a.slice(s![range]).to_owned()),
            ArrayValues::Int(a) => ArrayValues::Int(a.slice(s![range]).to_owned()),
            ArrayValues::Time(a) => ArrayValues::Time(a.slice(s![range]).to_owned()),
        }
    }

    /// Concatenate same-kind arrays end to end.
    fn concat(name: &str, parts: &[&ArrayValues]) -> AltiResult<Self> {
        let first = parts
            .first()
            .ok_or_else(|| AltiError::IncompatibleDatasets(format!("no parts for '{}'", name)))?;

        let mismatch = || {
            AltiError::IncompatibleDatasets(format!("'{}' has different kinds across parts", name))
        };

        macro_rules! join {
            ($variant:ident) => {{
                let views = parts
                    .iter()
                    .map(|p| match p {
                        ArrayValues::$variant(a) => Ok(a.view()),
                        _ => Err(mismatch()),
                    })
                    .collect::<AltiResult<Vec<_>>>()?;
                let joined = ndarray::concatenate(Axis(0), &views)
                    .map_err(|e| AltiError::IncompatibleDatasets(format!("'{}': {}", name, e)))?;
                ArrayValues::$variant(joined)
            }};
        }

        Ok(match first {
            ArrayValues::Float(_) => join!(Float),
            ArrayValues::Int(_) => join!(Int),
            ArrayValues::Time(_) => join!(Time),
        })
    }
}

impl From<Vec<f64>> for ArrayValues {
    fn from(values: Vec<f64>) -> Self {
        ArrayValues::Float(Array1::from_vec(values))
    }
}

impl From<Vec<i64>> for ArrayValues {
    fn from(values: Vec<i64>) -> Self {
        ArrayValues::Int(Array1::from_vec(values))
    }
}

impl From<Vec<DateTime<Utc>>> for ArrayValues {
    fn from(values: Vec<DateTime<Utc>>) -> Self {
        ArrayValues::Time(Array1::from_vec(values))
    }
}

/// Serialized form of [`ArrayValues`].
#[derive(Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "snake_case")]
enum RawValues {
    Float(Vec<Option<f64>>),
    Int(Vec<i64>),
    Time(Vec<DateTime<Utc>>),
}

impl From<RawValues> for ArrayValues {
    fn from(raw: RawValues) -> Self {
        match raw {
            RawValues::Float(v) => v
                .into_iter()
                .map(|x| x.unwrap_or(f64::NAN))
                .collect::<Vec<_>>()
                .into(),
            RawValues::Int(v) => v.into(),
            RawValues::Time(v) => v.into(),
        }
    }
}

impl From<ArrayValues> for RawValues {
    fn from(values: ArrayValues) -> Self {
        match values {
            ArrayValues::Float(a) => {
                RawValues::Float(a.iter().map(|x| x.is_finite().then_some(*x)).collect())
            }
            ArrayValues::Int(a) => RawValues::Int(a.to_vec()),
            ArrayValues::Time(a) => RawValues::Time(a.to_vec()),
        }
    }
}

/// A named array with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    pub values: ArrayValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DataArray {
    pub fn new(values: impl Into<ArrayValues>) -> Self {
        Self {
            values: values.into(),
            description: None,
            unit: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Descriptor of this array under the given name.
    pub fn variable(&self, name: &str) -> Variable {
        Variable {
            name: name.to_string(),
            description: self.description.clone(),
            unit: self.unit.clone(),
        }
    }

    fn map_values(&self, values: ArrayValues) -> Self {
        Self {
            values,
            description: self.description.clone(),
            unit: self.unit.clone(),
        }
    }
}

/// Named one-dimensional arrays sharing one index dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, DataArray>",
    into = "BTreeMap<String, DataArray>"
)]
pub struct Dataset {
    arrays: BTreeMap<String, DataArray>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an array, checking it matches the index length.
    pub fn insert(&mut self, name: impl Into<String>, array: DataArray) -> AltiResult<()> {
        let name = name.into();
        let others = self.arrays.iter().filter(|(n, _)| **n != name).count();
        if others > 0 && array.len() != self.len() {
            return Err(AltiError::ShapeMismatch {
                name,
                expected: self.len(),
                actual: array.len(),
            });
        }
        self.arrays.insert(name, array);
        Ok(())
    }

    /// Builder form of [`Dataset::insert`].
    pub fn with(mut self, name: impl Into<String>, array: impl Into<DataArray>) -> AltiResult<Self> {
        self.insert(name, array.into())?;
        Ok(self)
    }

    /// Number of records along the index dimension.
    pub fn len(&self) -> usize {
        self.arrays.values().next().map_or(0, DataArray::len)
    }

    /// A dataset is empty when it holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_variables(&self) -> usize {
        self.arrays.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.arrays.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataArray)> + '_ {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        self.arrays.remove(name)
    }

    pub fn float(&self, name: &str) -> AltiResult<&Array1<f64>> {
        match &self.require(name)?.values {
            ArrayValues::Float(a) => Ok(a),
            _ => Err(AltiError::DataType {
                name: name.to_string(),
                expected: "a float array",
            }),
        }
    }

    /// Integer array, also accepting float arrays holding whole numbers.
    pub fn int(&self, name: &str) -> AltiResult<Array1<i64>> {
        match &self.require(name)?.values {
            ArrayValues::Int(a) => Ok(a.clone()),
            ArrayValues::Float(a) if a.iter().all(|x| x.fract() == 0.0) => {
                Ok(a.mapv(|x| x as i64))
            }
            _ => Err(AltiError::DataType {
                name: name.to_string(),
                expected: "an integer array",
            }),
        }
    }

    pub fn time(&self, name: &str) -> AltiResult<&Array1<DateTime<Utc>>> {
        match &self.require(name)?.values {
            ArrayValues::Time(a) => Ok(a),
            _ => Err(AltiError::DataType {
                name: name.to_string(),
                expected: "a time array",
            }),
        }
    }

    fn require(&self, name: &str) -> AltiResult<&DataArray> {
        self.arrays
            .get(name)
            .ok_or_else(|| AltiError::UnknownVariable(name.to_string()))
    }

    /// Descriptors of every array.
    pub fn variables(&self) -> VariableMap {
        self.arrays
            .iter()
            .map(|(name, array)| (name.clone(), array.variable(name)))
            .collect()
    }

    /// Keep only the named arrays.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> AltiResult<Dataset> {
        let mut arrays = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            arrays.insert(name.to_string(), self.require(name)?.clone());
        }
        Ok(Dataset { arrays })
    }

    /// Gather records by index, in the given order.
    pub fn take(&self, indices: &[usize]) -> Dataset {
        self.map_arrays(|a| a.values.take(indices))
    }

    pub fn slice(&self, range: Range<usize>) -> Dataset {
        self.map_arrays(|a| a.values.slice(range.clone()))
    }

    /// Keep records where the mask is true.
    pub fn filter(&self, mask: &[bool]) -> AltiResult<Dataset> {
        if mask.len() != self.len() {
            return Err(AltiError::ShapeMismatch {
                name: "mask".to_string(),
                expected: self.len(),
                actual: mask.len(),
            });
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&indices))
    }

    /// Keep records whose time lies in the closed period.
    pub fn filter_period(&self, time_name: &str, period: &Period) -> AltiResult<Dataset> {
        if self.num_variables() == 0 {
            return Ok(self.clone());
        }
        let mask: Vec<bool> = self.time(time_name)?.iter().map(|t| period.contains(t)).collect();
        self.filter(&mask)
    }

    /// Reorder records by ascending time. The sort is stable.
    pub fn sort_by_time(&self, time_name: &str) -> AltiResult<Dataset> {
        let times = self.time(time_name)?;
        let mut indices: Vec<usize> = (0..times.len()).collect();
        indices.sort_by_key(|&i| times[i]);
        Ok(self.take(&indices))
    }

    /// First and last time, if any record exists.
    pub fn time_extent(&self, time_name: &str) -> AltiResult<Option<Period>> {
        let times = self.time(time_name)?;
        let start = times.iter().min().copied();
        let end = times.iter().max().copied();
        Ok(start.zip(end).map(|(s, e)| Period::new(s, e)))
    }

    /// Concatenate datasets along the index dimension, in order.
    ///
    /// Datasets without any array are skipped; the others must share the
    /// same array names and kinds.
    pub fn concat(datasets: impl IntoIterator<Item = Dataset>) -> AltiResult<Dataset> {
        let parts: Vec<Dataset> = datasets
            .into_iter()
            .filter(|d| d.num_variables() > 0)
            .collect();

        if parts.len() <= 1 {
            return Ok(parts.into_iter().next().unwrap_or_default());
        }
        let first = &parts[0];

        for part in &parts[1..] {
            if !part.names().eq(first.names()) {
                return Err(AltiError::IncompatibleDatasets(format!(
                    "variables {:?} differ from {:?}",
                    part.names().collect::<Vec<_>>(),
                    first.names().collect::<Vec<_>>()
                )));
            }
        }

        let mut arrays = BTreeMap::new();
        for (name, template) in &first.arrays {
            let values: Vec<&ArrayValues> = parts.iter().map(|p| &p.arrays[name].values).collect();
            let joined = ArrayValues::concat(name, &values)?;
            arrays.insert(name.clone(), template.map_values(joined));
        }
        Ok(Dataset { arrays })
    }

    fn map_arrays(&self, f: impl Fn(&DataArray) -> ArrayValues) -> Dataset {
        let arrays = self
            .arrays
            .iter()
            .map(|(name, array)| (name.clone(), array.map_values(f(array))))
            .collect();
        Dataset { arrays }
    }
}

impl From<ArrayValues> for DataArray {
    fn from(values: ArrayValues) -> Self {
        DataArray::new(values)
    }
}

impl TryFrom<BTreeMap<String, DataArray>> for Dataset {
    type Error = AltiError;

    fn try_from(arrays: BTreeMap<String, DataArray>) -> Result<Self, Self::Error> {
        let mut dataset = Dataset::new();
        for (name, array) in arrays {
            dataset.insert(name, array)?;
        }
        Ok(dataset)
    }
}

impl From<Dataset> for BTreeMap<String, DataArray> {
    fn from(dataset: Dataset) -> Self {
        dataset.arrays
    }
}
