use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{Location, LocationSeries};
use crate::processors::skeleton::HourlySkeleton;
use crate::readers::ObservationSource;
use crate::utils::progress::ProgressReporter;

/// Fetches every location on a bounded worker pool and aligns it to the skeleton
pub struct ConcurrentReader {
    max_workers: usize,
}

impl ConcurrentReader {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// One skeleton-aligned series per location, in roster order.
    ///
    /// A location whose fetch (or alignment) fails is logged and replaced by an
    /// all-missing series so the remaining locations proceed.
    pub fn read_all(
        &self,
        locations: &[Location],
        source: &dyn ObservationSource,
        skeleton: &HourlySkeleton,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<LocationSeries>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let done = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        let series: Vec<LocationSeries> = pool.install(|| {
            locations
                .par_iter()
                .map(|location| {
                    let result = source
                        .fetch(location, skeleton.start(), skeleton.end())
                        .and_then(|raw| skeleton.join(location, &raw));

                    let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    match result {
                        Ok(series) => series,
                        Err(e) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            warn!(location = %location.name, error = %e, "Fetch failed, using empty series");
                            skeleton.empty_series(location)
                        }
                    }
                })
                .collect()
        });

        info!(
            locations = locations.len(),
            failed = failed.load(Ordering::Relaxed),
            workers = self.max_workers,
            "Fetched location series"
        );
        Ok(series)
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
