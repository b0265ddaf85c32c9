//! Common types and utilities shared across the altimetry data access crates.

pub mod coordinates;
pub mod dataset;
pub mod error;
pub mod orbit;
pub mod polygon;
pub mod time;
pub mod variable;

pub use coordinates::CoordinateNames;
pub use dataset::{ArrayValues, DataArray, Dataset};
pub use error::{AltiError, AltiResult};
pub use orbit::{HalfOrbit, HalfOrbitPeriod, HalfOrbitTable};
pub use polygon::PolygonLike;
pub use time::{Period, Periods};
pub use variable::{Variable, VariableMap};
