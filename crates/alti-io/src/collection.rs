//! Half-orbit file collections.
//!
//! A collection is a directory tree holding one JSON [`Dataset`] per
//! half-orbit. Files are named
//!
//! ```text
//! <prefix>_<cycle>_<pass>_<first time>_<last time>.json
//! SWOT_L3_SSH_BASIC_012_345_20230726T050403_20230726T055530.json
//! ```
//!
//! The prefix may itself contain underscores: only the last four fields of
//! the file stem are interpreted. The index is built from file names alone,
//! so period and half-orbit lookups never open a file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use alti_common::orbit::HALF_ORBIT_FILE_EXTENSION;
use alti_common::time::parse_compact;
use alti_common::{
    AltiError, AltiResult, Dataset, HalfOrbit, HalfOrbitPeriod, HalfOrbitTable, Period,
};
use tracing::{debug, info};

/// One half-orbit file of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfOrbitFile {
    pub path: PathBuf,
    pub cycle_number: u32,
    pub pass_number: u32,
    pub period: Period,
}

impl HalfOrbitFile {
    /// Interpret a path following the collection naming convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some(HALF_ORBIT_FILE_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;

        let mut fields = stem.rsplitn(5, '_');
        let end = parse_compact(fields.next()?)?;
        let start = parse_compact(fields.next()?)?;
        let pass_number = fields.next()?.parse().ok()?;
        let cycle_number = fields.next()?.parse().ok()?;
        // A prefix is mandatory
        fields.next().filter(|prefix| !prefix.is_empty())?;

        Some(Self {
            path: path.to_path_buf(),
            cycle_number,
            pass_number,
            period: Period::new(start, end),
        })
    }

    pub fn half_orbit(&self) -> HalfOrbit {
        HalfOrbit::new(self.cycle_number, self.pass_number)
    }

    /// Decode the file's dataset.
    pub fn read(&self) -> AltiResult<Dataset> {
        let file = File::open(&self.path)?;
        let dataset: Dataset = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            path = %self.path.display(),
            records = dataset.len(),
            "Read half-orbit file"
        );
        Ok(dataset)
    }
}

/// An indexed directory of half-orbit files.
#[derive(Debug, Clone)]
pub struct FileCollection {
    root: PathBuf,
    files: Vec<HalfOrbitFile>,
}

impl FileCollection {
    /// Scan `root` recursively and index every half-orbit file.
    ///
    /// Files that do not follow the naming convention are ignored.
    pub fn open(root: impl AsRef<Path>) -> AltiResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(AltiError::Collection(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| AltiError::Collection(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            match HalfOrbitFile::from_path(entry.path()) {
                Some(file) => files.push(file),
                None => debug!(path = %entry.path().display(), "Skipping non half-orbit file"),
            }
        }

        files.sort_by(|a, b| {
            (a.half_orbit(), a.period.start).cmp(&(b.half_orbit(), b.period.start))
        });

        info!(root = %root.display(), files = files.len(), "Opened file collection");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Indexed files ordered by (cycle, pass, start time).
    pub fn files(&self) -> &[HalfOrbitFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Coverage of the whole collection.
    pub fn period(&self) -> Option<Period> {
        self.files
            .iter()
            .map(|f| f.period)
            .reduce(|acc, p| acc.union(&p))
    }

    /// One row per half-orbit; several files of one half-orbit are merged.
    pub fn half_orbit_periods(&self) -> HalfOrbitTable {
        let mut merged: BTreeMap<HalfOrbit, Period> = BTreeMap::new();
        for file in &self.files {
            merged
                .entry(file.half_orbit())
                .and_modify(|p| *p = p.union(&file.period))
                .or_insert(file.period);
        }

        HalfOrbitTable::new(
            merged
                .into_iter()
                .map(|(key, period)| HalfOrbitPeriod {
                    cycle_number: key.cycle_number,
                    pass_number: key.pass_number,
                    first_measurement_time: period.start,
                    last_measurement_time: period.end,
                })
                .collect(),
        )
    }

    /// Files whose coverage overlaps the period, in time order.
    pub fn files_in_period(&self, period: &Period) -> Vec<&HalfOrbitFile> {
        let mut files: Vec<&HalfOrbitFile> = self
            .files
            .iter()
            .filter(|f| f.period.overlaps(period))
            .collect();
        files.sort_by_key(|f| f.period.start);
        files
    }

    /// Files of a cycle, optionally restricted to one pass.
    pub fn files_for_orbit(&self, cycle_number: u32, pass_number: Option<u32>) -> Vec<&HalfOrbitFile> {
        self.files
            .iter()
            .filter(|f| {
                f.cycle_number == cycle_number && pass_number.map_or(true, |p| p == f.pass_number)
            })
            .collect()
    }

    /// Write a dataset as a half-orbit file under `dir`.
    ///
    /// The file's period is taken from the dataset's time extent.
    pub fn write_half_orbit(
        dir: impl AsRef<Path>,
        prefix: &str,
        half_orbit: HalfOrbit,
        dataset: &Dataset,
        time_name: &str,
    ) -> AltiResult<HalfOrbitFile> {
        let period = dataset.time_extent(time_name)?.ok_or_else(|| {
            AltiError::Collection(format!("half-orbit {} has no records", half_orbit))
        })?;

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(half_orbit.file_name(prefix, &period));

        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(writer, dataset)?;
        debug!(path = %path.display(), records = dataset.len(), "Wrote half-orbit file");

        Ok(HalfOrbitFile {
            path,
            cycle_number: half_orbit.cycle_number,
            pass_number: half_orbit.pass_number,
            period,
        })
    }
}
