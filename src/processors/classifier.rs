use tracing::warn;

use crate::error::Result;
use crate::models::{
    classify_region, pollution_class, pollution_level, ColumnData, Measurement, ObservationTable,
};
use crate::utils::constants::{COL_POLLUTION_CLASS, COL_POLLUTION_LEVEL};

/// Attaches region tags and AQI severity labels to a merged table
pub struct RegionLabelClassifier;

impl RegionLabelClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, table: ObservationTable) -> Result<ObservationTable> {
        let aqi = Measurement::Aqi.column_name();
        let label_aqi = table.has_column(aqi);

        table.map_series(|mut series| {
            series.region = classify_region(series.name());
            if series.region.is_none() {
                warn!(location = %series.name(), "Location is not in the region roster");
            }

            if label_aqi {
                let readings = series.require_float(aqi)?.to_vec();
                let levels = readings.iter().map(|&v| pollution_level(v)).collect();
                let classes = readings
                    .iter()
                    .map(|&v| pollution_class(v).map(i64::from))
                    .collect();

                series.insert_column_after(aqi, COL_POLLUTION_LEVEL, ColumnData::Level(levels))?;
                series.insert_column_after(
                    COL_POLLUTION_LEVEL,
                    COL_POLLUTION_CLASS,
                    ColumnData::Integer(classes),
                )?;
            }

            Ok(series)
        })
    }
}

impl Default for RegionLabelClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, LocationSeries, PollutionLevel, Region};
    use chrono::NaiveDate;

    fn series(name: &str, aqi: Option<Vec<Option<f64>>>) -> LocationSeries {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut s = LocationSeries::new(
            Location::new(name, 20.0, 105.0),
            (0..3).map(|h| t0 + chrono::Duration::hours(h)).collect(),
        );
        if let Some(values) = aqi {
            s.insert_column("aqi", ColumnData::Float(values)).unwrap();
        }
        s.insert_column("temp", ColumnData::Float(vec![Some(20.0); 3]))
            .unwrap();
        s
    }

    #[test]
    fn test_labels_follow_aqi() {
        let table = ObservationTable::new(vec![series(
            "Hà Nội",
            Some(vec![Some(35.0), None, Some(180.0)]),
        )])
        .unwrap();
        let table = RegionLabelClassifier::new().apply(table).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["aqi", "pollution_level", "pollution_class", "temp"]
        );

        let hanoi = table.get("Hà Nội").unwrap();
        assert_eq!(hanoi.region, Some(Region::RedRiverDelta));
        assert_eq!(
            hanoi.column("pollution_level").unwrap(),
            &ColumnData::Level(vec![
                PollutionLevel::Good,
                PollutionLevel::Unknown,
                PollutionLevel::Unhealthy
            ])
        );
        assert_eq!(
            hanoi.column("pollution_class").unwrap(),
            &ColumnData::Integer(vec![Some(0), None, Some(3)])
        );
    }

    #[test]
    fn test_unmapped_location_and_missing_aqi() {
        let table = ObservationTable::new(vec![series("Vientiane", None)]).unwrap();
        let table = RegionLabelClassifier::new().apply(table).unwrap();

        let series = table.get("Vientiane").unwrap();
        assert_eq!(series.region, None);
        assert!(!series.has_column("pollution_level"));
    }
}
