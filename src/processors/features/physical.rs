use tracing::debug;

use crate::error::Result;
use crate::models::{ColumnData, LocationSeries, Measurement, ObservationTable};
use crate::processors::features::window::{rolling_max, rolling_min, rolling_sum, shift, zip_with};
use crate::utils::constants::{RAIN_WINDOW_HOURS, TEMP_RANGE_WINDOW_HOURS};

/// Group 2: wind vector, rain washout, inversion proxy and humidity/temperature interaction
pub fn add_physical_features(table: ObservationTable) -> Result<ObservationTable> {
    let wind_speed = Measurement::WindSpeed.column_name();
    let wind_dir = Measurement::WindDir.column_name();
    let rain = Measurement::Rain.column_name();
    let temp = Measurement::Temp.column_name();
    let humidity = Measurement::Humidity.column_name();

    let has_wind = table.has_column(wind_speed) && table.has_column(wind_dir);
    let has_rain = table.has_column(rain);
    let has_temp = table.has_column(temp);
    let has_humidity = table.has_column(humidity);

    debug!(has_wind, has_rain, has_temp, has_humidity, "Physical feature inputs");

    table.map_series(|mut series| {
        if has_wind {
            wind_vector(&mut series, wind_speed, wind_dir)?;
        }

        if has_rain {
            // Rain over the six hours before the current one
            let shifted = shift(series.require_float(rain)?, 1);
            series.insert_column(
                "rain_sum_6h",
                ColumnData::Float(rolling_sum(&shifted, RAIN_WINDOW_HOURS)),
            )?;
        }

        if has_temp {
            let shifted = shift(series.require_float(temp)?, 1);
            let range = zip_with(
                &rolling_max(&shifted, TEMP_RANGE_WINDOW_HOURS),
                &rolling_min(&shifted, TEMP_RANGE_WINDOW_HOURS),
                |max, min| max - min,
            );
            series.insert_column("temp_diff_24h", ColumnData::Float(range))?;
        }

        if has_humidity && has_temp {
            let product = zip_with(
                series.require_float(humidity)?,
                series.require_float(temp)?,
                |h, t| h * t,
            );
            series.insert_column("humid_x_temp", ColumnData::Float(product))?;
        }

        Ok(series)
    })
}

/// Replace the circular wind direction with Cartesian components
fn wind_vector(series: &mut LocationSeries, speed: &str, direction: &str) -> Result<()> {
    let radians: Vec<Option<f64>> = series
        .require_float(direction)?
        .iter()
        .map(|d| d.map(f64::to_radians))
        .collect();
    let speeds = series.require_float(speed)?;

    let x = zip_with(speeds, &radians, |s, r| s * r.cos());
    let y = zip_with(speeds, &radians, |s, r| s * r.sin());

    series.insert_column("wind_x", ColumnData::Float(x))?;
    series.insert_column("wind_y", ColumnData::Float(y))?;
    series.drop_column(direction);
    Ok(())
}
