use chrono::NaiveDateTime;

use crate::error::{ProcessingError, Result};
use crate::models::LocationSeries;

/// Multi-location hourly table, held as one independent series per location.
///
/// Series are kept sorted by location name and share one schema: every series
/// carries the same column names in the same order. Grouped computations go
/// through [`ObservationTable::map_series`], so a window never reads across a
/// location boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    series: Vec<LocationSeries>,
}

impl ObservationTable {
    pub fn new(mut series: Vec<LocationSeries>) -> Result<Self> {
        series.sort_by(|a, b| a.name().cmp(b.name()));

        if let Some(pair) = series.windows(2).find(|w| w[0].name() == w[1].name()) {
            return Err(ProcessingError::DuplicateLocation(pair[0].name().to_string()));
        }

        if let Some(first) = series.first() {
            let schema = first.column_names();
            if let Some(other) = series.iter().find(|s| s.column_names() != schema) {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Location '{}' has columns {:?}, expected {:?}",
                    other.name(),
                    other.column_names(),
                    schema
                )));
            }
        }

        Ok(Self { series })
    }

    pub fn series(&self) -> &[LocationSeries] {
        &self.series
    }

    pub fn into_series(self) -> Vec<LocationSeries> {
        self.series
    }

    pub fn get(&self, location: &str) -> Option<&LocationSeries> {
        self.series.iter().find(|s| s.name() == location)
    }

    pub fn location_count(&self) -> usize {
        self.series.len()
    }

    pub fn row_count(&self) -> usize {
        self.series.iter().map(LocationSeries::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.series
            .first()
            .map(LocationSeries::column_names)
            .unwrap_or_default()
    }

    pub fn has_column(&self, name: &str) -> bool {
        !self.series.is_empty() && self.series.iter().all(|s| s.has_column(name))
    }

    /// Run `f` on every location's series independently and rebuild the table
    pub fn map_series<F>(self, f: F) -> Result<Self>
    where
        F: Fn(LocationSeries) -> Result<LocationSeries>,
    {
        let series = self
            .series
            .into_iter()
            .map(f)
            .collect::<Result<Vec<_>>>()?;
        Self::new(series)
    }

    /// Sorted, de-duplicated timestamps across all locations
    pub fn distinct_timestamps(&self) -> Vec<NaiveDateTime> {
        let mut timestamps: Vec<NaiveDateTime> = self
            .series
            .iter()
            .flat_map(|s| s.timestamps().iter().copied())
            .collect();
        timestamps.sort_unstable();
        timestamps.dedup();
        timestamps
    }

    /// (series index, row index) pairs in (timestamp, location) order
    pub fn row_order(&self) -> Vec<(usize, usize)> {
        let mut order: Vec<(usize, usize)> = self
            .series
            .iter()
            .enumerate()
            .flat_map(|(s, series)| (0..series.len()).map(move |r| (s, r)))
            .collect();

        // Series are already sorted by name, so the series index breaks ties
        order.sort_by_key(|&(s, r)| (self.series[s].timestamps()[r], s));
        order
    }
}
