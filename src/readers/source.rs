use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Location, RawObservations};
use crate::readers::ObservationReader;

/// Supplies raw hourly observations for one location over a date range.
///
/// Retrying, rate limiting and sessions belong to the implementation; callers
/// treat any error as "no data for this location".
pub trait ObservationSource: Send + Sync {
    fn fetch(&self, location: &Location, start: NaiveDate, end: NaiveDate) -> Result<RawObservations>;
}

/// Reads `<dir>/<location name>.csv` files written by an external fetcher
pub struct DirectorySource {
    root: PathBuf,
    reader: ObservationReader,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reader: ObservationReader::new(),
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.reader = ObservationReader::with_mmap(use_mmap);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, location: &Location) -> PathBuf {
        self.root.join(format!("{}.csv", location.file_stem()))
    }
}

impl ObservationSource for DirectorySource {
    fn fetch(&self, location: &Location, start: NaiveDate, end: NaiveDate) -> Result<RawObservations> {
        let path = self.path_for(location);
        if !path.is_file() {
            return Err(ProcessingError::Fetch {
                location: location.name.clone(),
                message: format!("{} not found", path.display()),
            });
        }

        debug!(location = %location.name, %start, %end, path = %path.display(), "Reading observations");
        self.reader
            .read_observations(&path)
            .map_err(|e| ProcessingError::Fetch {
                location: location.name.clone(),
                message: e.to_string(),
            })
    }
}
