use crate::error::Result;
use crate::models::{ColumnData, Measurement, ObservationTable};
use crate::processors::features::window::{shift, zip_with};
use crate::utils::constants::PM_RATIO_EPSILON;

/// Sources of the one-hour exogenous lags, in output order
const EXOGENOUS_LAG_SOURCES: [&str; 7] = ["no2", "so2", "co", "o3", "coarse_dust", "pm_ratio", "pm10"];

/// Group 4: particulate composition and one-hour lags of co-pollutants
pub fn add_composition_features(table: ObservationTable) -> Result<ObservationTable> {
    let pm25 = Measurement::Pm2_5.column_name();
    let pm10 = Measurement::Pm10.column_name();
    let has_particulates = table.has_column(pm25) && table.has_column(pm10);

    table.map_series(|mut series| {
        if has_particulates {
            let fine = series.require_float(pm25)?.to_vec();
            let coarse = series.require_float(pm10)?.to_vec();

            series.insert_column(
                "coarse_dust",
                ColumnData::Float(zip_with(&coarse, &fine, |p10, p25| p10 - p25)),
            )?;
            series.insert_column(
                "pm_ratio",
                ColumnData::Float(zip_with(&fine, &coarse, |p25, p10| {
                    p25 / (p10 + PM_RATIO_EPSILON)
                })),
            )?;
        }

        for source in EXOGENOUS_LAG_SOURCES {
            if let Some(values) = series.float(source) {
                let lagged = shift(values, 1);
                series.insert_column(&format!("{}_lag1h", source), ColumnData::Float(lagged))?;
            }
        }

        Ok(series)
    })
}
