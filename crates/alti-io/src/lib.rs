//! Query facade over satellite altimetry data sources.
//!
//! Along-track altimetry products are distributed in several layouts: one
//! file per half-orbit, single tables, or named collections listed in a
//! catalog. This crate hides the layout behind the [`AltimetrySource`]
//! trait and wraps any source in [`AltimetryData`].
//!
//! # Architecture
//!
//! ```text
//! AltimetryData::query(periods)
//!      │
//!      ▼
//! AltimetrySource::query ──► query_date (once per period)
//!      │                          │
//!      │                          ├─► FileCollectionSource: read overlapping half-orbit files
//!      │                          ├─► TableSource: binary search on the time column
//!      │                          └─► CatalogSource: delegate to the resolved backend
//!      │
//!      └─► finalize: polygon restriction, then variable selection
//! ```
//!
//! # Example
//!
//! ```ignore
//! use alti_io::{AltimetryData, CatalogSource, QueryOptions};
//! use alti_common::{Period, PolygonLike};
//!
//! let source = CatalogSource::from_env("swot_l3")?;
//! let data = AltimetryData::new(source);
//!
//! let options = QueryOptions::new()
//!     .with_variables(["ssha"])
//!     .within(PolygonLike::bbox(-10.0, 10.0, 30.0, 45.0)?);
//! let dataset = data
//!     .query(Period::parse("2023-07-26/2023-07-27")?, &options, true)?
//!     .into_merged()?;
//! ```

pub mod catalog;
pub mod collection;
pub mod config;
pub mod data;
pub mod query;
pub mod source;
pub mod table;

// Re-export commonly used types at crate root
pub use catalog::{Catalog, CatalogEntry, CollectionKind, CATALOG_ENV};
pub use collection::{FileCollection, HalfOrbitFile};
pub use config::AltimetryConfig;
pub use data::{AltimetryData, VariableTable};
pub use query::{BackendOptions, OrbitGroup, OrbitQuery, QueryOptions, QueryOutput};
pub use source::{
    restrict_to_polygon, AltimetrySource, CatalogBackend, CatalogSource, FileCollectionSource,
    FileReadOptions, TableSource,
};
pub use table::{OrbitColumns, Table};
