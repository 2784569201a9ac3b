use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{ColumnData, LocationSeries, Measurement, ObservationTable};
use crate::processors::features::window::shift;
use crate::utils::constants::{COL_TARGET, DEFAULT_TRAIN_RATIO, DEFAULT_VAL_RATIO};

/// Chronological train/validation/test partition of the feature table
#[derive(Debug, Clone)]
pub struct TemporalSplit {
    pub train: ObservationTable,
    pub validation: ObservationTable,
    pub test: ObservationTable,
    pub train_cut: NaiveDateTime,
    pub val_cut: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub train_cut: NaiveDateTime,
    pub val_cut: NaiveDateTime,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub test_rows: usize,
    pub columns: Vec<String>,
}

impl TemporalSplit {
    pub fn summary(&self) -> SplitSummary {
        SplitSummary {
            train_cut: self.train_cut,
            val_cut: self.val_cut,
            train_rows: self.train.row_count(),
            validation_rows: self.validation.row_count(),
            test_rows: self.test.row_count(),
            columns: self
                .train
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

pub struct TemporalSplitter {
    train_ratio: f64,
    val_ratio: f64,
}

impl TemporalSplitter {
    pub fn new() -> Self {
        Self {
            train_ratio: DEFAULT_TRAIN_RATIO,
            val_ratio: DEFAULT_VAL_RATIO,
        }
    }

    pub fn with_ratios(train_ratio: f64, val_ratio: f64) -> Result<Self> {
        if !(train_ratio > 0.0 && val_ratio >= 0.0 && train_ratio + val_ratio < 1.0) {
            return Err(ProcessingError::Config(format!(
                "Invalid split ratios: train={}, val={}",
                train_ratio, val_ratio
            )));
        }
        Ok(Self {
            train_ratio,
            val_ratio,
        })
    }

    /// Attach the next-hour PM2.5 target, drop incomplete rows and partition by month cut-overs
    pub fn split(&self, table: ObservationTable) -> Result<TemporalSplit> {
        let eligible = self.eligible_rows(table)?;

        let (train_cut, val_cut) = self.cut_points(&eligible)?;
        info!(%train_cut, %val_cut, rows = eligible.row_count(), "Split boundaries");

        let train = partition(&eligible, |ts| ts < train_cut)?;
        let validation = partition(&eligible, |ts| ts >= train_cut && ts < val_cut)?;
        let test = partition(&eligible, |ts| ts >= val_cut)?;

        Ok(TemporalSplit {
            train,
            validation,
            test,
            train_cut,
            val_cut,
        })
    }

    /// Rows with a next-hour target and no missing cell
    pub fn eligible_rows(&self, table: ObservationTable) -> Result<ObservationTable> {
        let target = Measurement::Pm2_5.column_name();
        if !table.has_column(target) {
            return Err(ProcessingError::MissingColumn(target.to_string()));
        }

        let before = table.row_count();
        let eligible = table.map_series(|mut series| {
            let future = shift(series.require_float(target)?, -1);
            series.insert_column(COL_TARGET, ColumnData::Float(future))?;

            if series.region.is_none() && !series.is_empty() {
                warn!(location = %series.name(), "Dropping location without a region");
            }

            let keep: Vec<bool> = (0..series.len()).map(|r| series.row_is_complete(r)).collect();
            Ok(series.filter_rows(&keep))
        })?;
        let eligible = without_empty_series(eligible.into_series())?;

        info!(
            kept = eligible.row_count(),
            dropped = before - eligible.row_count(),
            "Dropped incomplete rows"
        );
        Ok(eligible)
    }

    /// Month-start cut-overs at the train and train+val quantiles of the distinct timestamps
    pub fn cut_points(&self, table: &ObservationTable) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let timestamps = table.distinct_timestamps();
        if timestamps.is_empty() {
            return Err(ProcessingError::InsufficientData(
                "No complete rows left to split".to_string(),
            ));
        }

        let n = timestamps.len();
        let train_idx = (n as f64 * self.train_ratio) as usize;
        let val_idx = (n as f64 * (self.train_ratio + self.val_ratio)) as usize;

        let train_cut = month_start(timestamps[train_idx.min(n - 1)]);
        let val_cut = month_start(timestamps[val_idx.min(n - 1)]);

        if train_cut >= val_cut {
            return Err(ProcessingError::DegenerateSplit { train_cut, val_cut });
        }
        Ok((train_cut, val_cut))
    }
}

impl Default for TemporalSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// First day of the month at midnight
pub fn month_start(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
        .unwrap_or(ts.date())
        .and_time(chrono::NaiveTime::MIN)
}

fn partition<F>(table: &ObservationTable, in_range: F) -> Result<ObservationTable>
where
    F: Fn(NaiveDateTime) -> bool,
{
    let series: Vec<LocationSeries> = table
        .series()
        .iter()
        .map(|s| {
            let keep: Vec<bool> = s.timestamps().iter().map(|&ts| in_range(ts)).collect();
            s.filter_rows(&keep)
        })
        .collect();
    without_empty_series(series)
}

/// Locations with no rows left are not part of a delivered table
fn without_empty_series(series: Vec<LocationSeries>) -> Result<ObservationTable> {
    ObservationTable::new(series.into_iter().filter(|s| !s.is_empty()).collect())
}
