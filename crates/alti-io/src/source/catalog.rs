//! Source resolved through a catalog entry.

use std::sync::Arc;

use alti_common::{
    AltiResult, CoordinateNames, Dataset, HalfOrbit, HalfOrbitTable, Period, VariableMap,
};
use tracing::info;

use super::{AltimetrySource, FileCollectionSource, TableSource};
use crate::catalog::{Catalog, CollectionKind};
use crate::query::{OrbitQuery, QueryOptions, QueryOutput};

/// Concrete backend a catalog entry resolves to.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Files(FileCollectionSource),
    Table(TableSource),
}

/// Altimetry source for one named collection of a [`Catalog`].
#[derive(Debug, Clone)]
pub struct CatalogSource {
    catalog: Arc<Catalog>,
    name: String,
    backend: CatalogBackend,
}

impl CatalogSource {
    /// Open the collection `name` of `catalog`.
    pub fn open(catalog: Arc<Catalog>, name: &str) -> AltiResult<Self> {
        let entry = catalog.entry(name)?;
        let coordinates = entry.coordinates.clone();

        let backend = match entry.kind {
            CollectionKind::Files => {
                CatalogBackend::Files(FileCollectionSource::open(&entry.path, coordinates)?)
            }
            CollectionKind::Table => CatalogBackend::Table(
                TableSource::open(&entry.path, coordinates)?
                    .with_orbit_columns(entry.orbit_columns.clone()),
            ),
        };
        info!(collection = %name, kind = ?entry.kind, "Opened catalog collection");

        Ok(Self {
            catalog,
            name: name.to_string(),
            backend,
        })
    }

    /// Open a collection of the catalog named by the environment.
    pub fn from_env(name: &str) -> AltiResult<Self> {
        Self::open(Arc::new(Catalog::from_env()?), name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &CatalogBackend {
        &self.backend
    }
}

/// Run `$body` against whichever backend the catalog entry resolved to.
macro_rules! delegate {
    ($self:ident, $source:ident => $body:expr) => {
        match &$self.backend {
            CatalogBackend::Files($source) => $body,
            CatalogBackend::Table($source) => $body,
        }
    };
}

impl AltimetrySource for CatalogSource {
    type Handler = Arc<Catalog>;

    fn coordinates(&self) -> &CoordinateNames {
        delegate!(self, source => source.coordinates())
    }

    fn handler(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    fn variables(&self) -> AltiResult<VariableMap> {
        delegate!(self, source => source.variables())
    }

    fn period(&self) -> AltiResult<Period> {
        delegate!(self, source => source.period())
    }

    fn half_orbit_periods(
        &self,
        half_orbit_min: Option<HalfOrbit>,
        half_orbit_max: Option<HalfOrbit>,
    ) -> AltiResult<HalfOrbitTable> {
        delegate!(self, source => source.half_orbit_periods(half_orbit_min, half_orbit_max))
    }

    fn query_date(&self, period: &Period, options: &QueryOptions) -> AltiResult<Dataset> {
        delegate!(self, source => source.query_date(period, options))
    }

    fn query_orbit(&self, query: &OrbitQuery) -> AltiResult<QueryOutput> {
        delegate!(self, source => source.query_orbit(query))
    }
}
