use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{ProcessingError, Result};
use crate::models::{ColumnData, Location, LocationSeries, RawObservations};

/// Dense hourly timestamp sequence covering the study period.
///
/// Runs from `start 00:00` to `end 00:00` inclusive, one instant per hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySkeleton {
    start: NaiveDate,
    end: NaiveDate,
    timestamps: Vec<NaiveDateTime>,
}

impl HourlySkeleton {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ProcessingError::Config(format!(
                "End date {} is before start date {}",
                end, start
            )));
        }

        let first = start.and_time(chrono::NaiveTime::MIN);
        let last = end.and_time(chrono::NaiveTime::MIN);
        let hours = (last - first).num_hours();
        let timestamps = (0..=hours).map(|h| first + Duration::hours(h)).collect();

        Ok(Self {
            start,
            end,
            timestamps,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// All-missing series for a location whose data could not be fetched
    pub fn empty_series(&self, location: &Location) -> LocationSeries {
        LocationSeries::new(location.clone(), self.timestamps.clone())
    }

    /// Left-join raw readings onto the skeleton.
    ///
    /// Readings outside the skeleton are discarded; for duplicated hours the
    /// first reading wins. Every measurement the fetcher supplied becomes a
    /// column, even if none of its values land inside the study period.
    pub fn join(&self, location: &Location, raw: &RawObservations) -> Result<LocationSeries> {
        let mut by_hour: HashMap<NaiveDateTime, usize> = HashMap::with_capacity(raw.len());
        let mut duplicates = 0usize;
        for (idx, reading) in raw.readings.iter().enumerate() {
            if reading.values.len() != raw.measurements.len() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Reading at {} for {} has {} values, expected {}",
                    reading.timestamp,
                    location.name,
                    reading.values.len(),
                    raw.measurements.len()
                )));
            }
            if by_hour.insert(reading.timestamp, idx).is_some() {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            warn!(
                location = %location.name,
                duplicates, "Duplicate hourly readings, keeping the first of each"
            );
            by_hour.clear();
            for (idx, reading) in raw.readings.iter().enumerate() {
                by_hour.entry(reading.timestamp).or_insert(idx);
            }
        }

        let rows: Vec<Option<usize>> = self
            .timestamps
            .iter()
            .map(|ts| by_hour.get(ts).copied())
            .collect();

        let mut series = self.empty_series(location);
        for (col, measurement) in raw.measurements.iter().enumerate() {
            let values = rows
                .iter()
                .map(|row| row.and_then(|r| raw.readings[r].values[col]))
                .collect();
            series.insert_column(measurement.column_name(), ColumnData::Float(values))?;
        }

        Ok(series)
    }
}

/// Latest date worth requesting: `today - lag_days`, so providers have published the data
pub fn operational_end_date(today: NaiveDate, lag_days: i64) -> NaiveDate {
    today - Duration::days(lag_days)
}
