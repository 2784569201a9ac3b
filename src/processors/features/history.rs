use crate::error::Result;
use crate::models::{ColumnData, Measurement, ObservationTable};
use crate::processors::features::window::{rolling_mean, rolling_std, shift, zip_with};
use crate::utils::constants::{LONG_ROLLING_HOURS, PM25_LAGS, SHORT_ROLLING_HOURS};

/// Group 3: lags, trailing statistics and short-term trend of PM2.5
pub fn add_history_features(table: ObservationTable) -> Result<ObservationTable> {
    let target = Measurement::Pm2_5.column_name();
    if !table.has_column(target) {
        return Ok(table);
    }

    table.map_series(|mut series| {
        let pm25 = series.require_float(target)?.to_vec();

        for lag in PM25_LAGS {
            series.insert_column(
                &format!("pm25_lag_{}h", lag),
                ColumnData::Float(shift(&pm25, lag as isize)),
            )?;
        }

        let shifted = shift(&pm25, 1);
        series.insert_column(
            "pm25_rm_6h",
            ColumnData::Float(rolling_mean(&shifted, SHORT_ROLLING_HOURS)),
        )?;
        series.insert_column(
            "pm25_rs_6h",
            ColumnData::Float(rolling_std(&shifted, SHORT_ROLLING_HOURS)),
        )?;
        series.insert_column(
            "pm25_rm_24h",
            ColumnData::Float(rolling_mean(&shifted, LONG_ROLLING_HOURS)),
        )?;

        let trend = zip_with(&shifted, &shift(&pm25, 2), |lag1, lag2| lag1 - lag2);
        series.insert_column("pm25_trend_1h", ColumnData::Float(trend))?;

        Ok(series)
    })
}
