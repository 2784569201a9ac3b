use tracing::debug;

use crate::error::Result;
use crate::models::{ColumnData, LocationSeries, Measurement, ObservationTable};

pub struct DataMerger;

impl DataMerger {
    pub fn new() -> Self {
        Self
    }

    /// Concatenate per-location series into one table.
    ///
    /// A measurement becomes a table column if any location supplied it;
    /// locations that never did get an all-missing column. Columns are laid
    /// out in the persisted order.
    pub fn merge_locations(&self, series: Vec<LocationSeries>) -> Result<ObservationTable> {
        let present: Vec<Measurement> = Measurement::ALL
            .into_iter()
            .filter(|m| series.iter().any(|s| s.has_column(m.column_name())))
            .collect();

        debug!(
            locations = series.len(),
            columns = ?present.iter().map(|m| m.column_name()).collect::<Vec<_>>(),
            "Merging location series"
        );

        let merged = series
            .into_iter()
            .map(|s| self.conform(s, &present))
            .collect::<Result<Vec<_>>>()?;

        ObservationTable::new(merged)
    }

    /// Rebuild a series with exactly the `present` measurement columns, in order
    fn conform(&self, mut source: LocationSeries, present: &[Measurement]) -> Result<LocationSeries> {
        let len = source.len();
        let mut target = LocationSeries::new(source.location.clone(), source.timestamps().to_vec());
        target.region = source.region;

        for measurement in present {
            let data = source
                .drop_column(measurement.column_name())
                .unwrap_or_else(|| ColumnData::Float(vec![None; len]));
            target.insert_column(measurement.column_name(), data)?;
        }

        Ok(target)
    }
}

impl Default for DataMerger {
    fn default() -> Self {
        Self::new()
    }
}
