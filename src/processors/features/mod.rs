//! Feature engineering over the merged multi-location table.
//!
//! Four groups run in a fixed order because later groups read columns
//! produced by earlier ones. Every look-back feature is computed on the
//! value series shifted by one hour, so a row at hour t only sees data up
//! to t-1. Groups skip features whose inputs are absent.

pub mod composition;
pub mod history;
pub mod physical;
pub mod temporal;
pub mod window;

use std::fmt;
use tracing::info;

use crate::error::Result;
use crate::models::ObservationTable;
use crate::utils::progress::ProgressReporter;

pub use composition::add_composition_features;
pub use history::add_history_features;
pub use physical::add_physical_features;
pub use temporal::add_temporal_features;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureGroup {
    TemporalSocial,
    Physical,
    HistoryTrend,
    Composition,
}

impl FeatureGroup {
    pub const ORDERED: [FeatureGroup; 4] = [
        FeatureGroup::TemporalSocial,
        FeatureGroup::Physical,
        FeatureGroup::HistoryTrend,
        FeatureGroup::Composition,
    ];

    pub fn apply(&self, table: ObservationTable) -> Result<ObservationTable> {
        match self {
            FeatureGroup::TemporalSocial => add_temporal_features(table),
            FeatureGroup::Physical => add_physical_features(table),
            FeatureGroup::HistoryTrend => add_history_features(table),
            FeatureGroup::Composition => add_composition_features(table),
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureGroup::TemporalSocial => "temporal & social",
            FeatureGroup::Physical => "physics & meteo",
            FeatureGroup::HistoryTrend => "history & trend",
            FeatureGroup::Composition => "composition",
        };
        f.write_str(name)
    }
}

pub struct FeatureEngine {
    groups: Vec<FeatureGroup>,
}

impl FeatureEngine {
    pub fn new() -> Self {
        Self {
            groups: FeatureGroup::ORDERED.to_vec(),
        }
    }

    /// Restrict the engine to a subset of groups; they still run in canonical order
    pub fn with_groups(groups: &[FeatureGroup]) -> Self {
        Self {
            groups: FeatureGroup::ORDERED
                .into_iter()
                .filter(|g| groups.contains(g))
                .collect(),
        }
    }

    pub fn apply(&self, table: ObservationTable, progress: Option<&ProgressReporter>) -> Result<ObservationTable> {
        let mut table = table;
        for (step, group) in self.groups.iter().enumerate() {
            if let Some(p) = progress {
                p.set_message(&format!("Feature group {}/{}: {}", step + 1, self.groups.len(), group));
            }
            let before = table.column_names().len();
            table = group.apply(table)?;
            info!(
                group = %group,
                added = table.column_names().len() as i64 - before as i64,
                "Feature group applied"
            );
        }
        Ok(table)
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnData, Location, LocationSeries};
    use chrono::{Duration, NaiveDate};

    fn sample_table() -> ObservationTable {
        let t0 = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let n = 40;
        let build = |name: &str, offset: f64| {
            let timestamps = (0..n).map(|h| t0 + Duration::hours(h as i64)).collect();
            let mut s = LocationSeries::new(Location::new(name, 20.0, 105.0), timestamps);
            let wave = |scale: f64| -> Vec<Option<f64>> {
                (0..n)
                    .map(|h| Some(offset + scale * ((h % 7) as f64)))
                    .collect()
            };
            for (col, scale) in [
                ("temp", 1.0),
                ("humidity", 3.0),
                ("rain", 0.2),
                ("wind_speed", 2.0),
                ("wind_dir", 40.0),
                ("pm2_5", 4.0),
                ("pm10", 6.0),
                ("no2", 1.5),
            ] {
                s.insert_column(col, ColumnData::Float(wave(scale))).unwrap();
            }
            s
        };
        ObservationTable::new(vec![build("Hà Nội", 10.0), build("Hải Phòng", 30.0)]).unwrap()
    }

    #[test]
    fn test_all_groups_in_order() {
        let table = FeatureEngine::new().apply(sample_table(), None).unwrap();
        let columns = table.column_names();

        for expected in [
            "hour_sin",
            "season",
            "wind_x",
            "rain_sum_6h",
            "temp_diff_24h",
            "humid_x_temp",
            "pm25_lag_24h",
            "pm25_rs_6h",
            "pm25_trend_1h",
            "coarse_dust",
            "pm_ratio",
            "no2_lag1h",
            "pm10_lag1h",
        ] {
            assert!(columns.contains(&expected), "missing {}", expected);
        }
        assert!(!columns.contains(&"wind_dir"));

        let position = |name: &str| columns.iter().position(|c| *c == name).unwrap();
        assert!(position("month_cos") < position("wind_x"));
        assert!(position("humid_x_temp") < position("pm25_lag_1h"));
        assert!(position("pm25_trend_1h") < position("coarse_dust"));
    }

    #[test]
    fn test_rerunning_groups_keeps_produced_columns() {
        let once = FeatureEngine::new().apply(sample_table(), None).unwrap();
        let twice = FeatureEngine::new().apply(once.clone(), None).unwrap();
        pretty_assertions::assert_eq!(once, twice);
    }

    #[test]
    fn test_subset_runs_in_canonical_order() {
        let engine = FeatureEngine::with_groups(&[FeatureGroup::Composition, FeatureGroup::TemporalSocial]);
        let table = engine.apply(sample_table(), None).unwrap();
        assert!(table.has_column("hour"));
        assert!(table.has_column("coarse_dust"));
        assert!(!table.has_column("pm25_lag_1h"));
        assert!(table.has_column("wind_dir"));
    }
}
