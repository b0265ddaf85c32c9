//! Source backed by a directory of half-orbit files.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use alti_common::{
    AltiError, AltiResult, CoordinateNames, Dataset, HalfOrbit, HalfOrbitTable, Period,
    VariableMap,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{finalize, AltimetrySource};
use crate::collection::{FileCollection, HalfOrbitFile};
use crate::query::{OrbitQuery, QueryOptions, QueryOutput};

/// Backend options understood by [`FileCollectionSource`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileReadOptions {
    /// Log and skip files that fail to decode instead of failing the query.
    pub skip_unreadable: bool,
}

/// Altimetry source reading a [`FileCollection`].
///
/// Variables are read from the first decodable file once and cached; clones
/// share the cache.
#[derive(Debug, Clone)]
pub struct FileCollectionSource {
    coordinates: CoordinateNames,
    collection: Arc<FileCollection>,
    variables: Arc<OnceLock<VariableMap>>,
}

impl FileCollectionSource {
    pub fn new(collection: Arc<FileCollection>, coordinates: CoordinateNames) -> Self {
        Self {
            coordinates,
            collection,
            variables: Arc::new(OnceLock::new()),
        }
    }

    /// Open the collection rooted at `root`.
    pub fn open(root: impl AsRef<Path>, coordinates: CoordinateNames) -> AltiResult<Self> {
        Ok(Self::new(Arc::new(FileCollection::open(root)?), coordinates))
    }

    pub fn collection(&self) -> &Arc<FileCollection> {
        &self.collection
    }

    /// Variables of the first file that decodes.
    fn read_variables(&self) -> AltiResult<VariableMap> {
        let mut last_error = None;
        for file in self.collection.files() {
            match file.read() {
                Ok(dataset) => return Ok(dataset.variables()),
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Skipping unreadable file");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(VariableMap::new()),
        }
    }

    fn read_all<'a>(
        &self,
        files: impl IntoIterator<Item = &'a HalfOrbitFile>,
        read_options: &FileReadOptions,
    ) -> AltiResult<Dataset> {
        let mut parts = Vec::new();
        for file in files {
            match file.read() {
                Ok(dataset) => parts.push(dataset),
                Err(e) if read_options.skip_unreadable => {
                    warn!(path = %file.path.display(), error = %e, "Skipping unreadable file");
                }
                Err(e) => return Err(e),
            }
        }
        Dataset::concat(parts)
    }
}

impl AltimetrySource for FileCollectionSource {
    type Handler = FileCollection;

    fn coordinates(&self) -> &CoordinateNames {
        &self.coordinates
    }

    fn handler(&self) -> &FileCollection {
        &self.collection
    }

    fn variables(&self) -> AltiResult<VariableMap> {
        if let Some(variables) = self.variables.get() {
            return Ok(variables.clone());
        }
        let variables = self.read_variables()?;
        Ok(self.variables.get_or_init(|| variables).clone())
    }

    fn period(&self) -> AltiResult<Period> {
        self.collection.period().ok_or_else(|| {
            AltiError::Collection(format!(
                "no half-orbit files under {}",
                self.collection.root().display()
            ))
        })
    }

    fn half_orbit_periods(
        &self,
        half_orbit_min: Option<HalfOrbit>,
        half_orbit_max: Option<HalfOrbit>,
    ) -> AltiResult<HalfOrbitTable> {
        self.collection
            .half_orbit_periods()
            .bounded(half_orbit_min, half_orbit_max)
    }

    fn query_date(&self, period: &Period, options: &QueryOptions) -> AltiResult<Dataset> {
        period.validate()?;
        let read_options: FileReadOptions = options.backend()?;
        let variables = self.variables()?;

        let files = self.collection.files_in_period(period);
        debug!(%period, files = files.len(), "Date query");

        let data = self
            .read_all(files, &read_options)?
            .filter_period(&self.coordinates.time, period)?;
        finalize(data, options, &self.coordinates, &variables)
    }

    fn query_orbit(&self, query: &OrbitQuery) -> AltiResult<QueryOutput> {
        query.validate()?;
        let read_options: FileReadOptions = query.options.backend()?;
        let variables = self.variables()?;

        let mut parts = Vec::new();
        for group in query.groups() {
            let files = self
                .collection
                .files_for_orbit(group.cycle_number, group.pass_number);
            debug!(
                cycle = group.cycle_number,
                pass = ?group.pass_number,
                files = files.len(),
                "Orbit query"
            );
            let data = self.read_all(files, &read_options)?;
            parts.push(finalize(data, &query.options, &self.coordinates, &variables)?);
        }

        QueryOutput::assemble(parts, query.concat)
    }
}
