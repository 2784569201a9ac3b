use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hourly measurement supplied by the air-quality and weather providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measurement {
    Aqi,
    Temp,
    Humidity,
    Rain,
    WindSpeed,
    WindDir,
    Pressure,
    Cloud,
    Pm2_5,
    Pm10,
    Co,
    No2,
    O3,
    So2,
}

impl Measurement {
    /// Persisted column order
    pub const ALL: [Measurement; 14] = [
        Measurement::Aqi,
        Measurement::Temp,
        Measurement::Humidity,
        Measurement::Rain,
        Measurement::WindSpeed,
        Measurement::WindDir,
        Measurement::Pressure,
        Measurement::Cloud,
        Measurement::Pm2_5,
        Measurement::Pm10,
        Measurement::Co,
        Measurement::No2,
        Measurement::O3,
        Measurement::So2,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Measurement::Aqi => "aqi",
            Measurement::Temp => "temp",
            Measurement::Humidity => "humidity",
            Measurement::Rain => "rain",
            Measurement::WindSpeed => "wind_speed",
            Measurement::WindDir => "wind_dir",
            Measurement::Pressure => "pressure",
            Measurement::Cloud => "cloud",
            Measurement::Pm2_5 => "pm2_5",
            Measurement::Pm10 => "pm10",
            Measurement::Co => "co",
            Measurement::No2 => "no2",
            Measurement::O3 => "o3",
            Measurement::So2 => "so2",
        }
    }

    /// Field name used by the upstream hourly APIs
    pub fn upstream_name(&self) -> &'static str {
        match self {
            Measurement::Aqi => "us_aqi",
            Measurement::Temp => "temperature_2m",
            Measurement::Humidity => "relative_humidity_2m",
            Measurement::Rain => "precipitation",
            Measurement::WindSpeed => "wind_speed_10m",
            Measurement::WindDir => "wind_direction_10m",
            Measurement::Pressure => "surface_pressure",
            Measurement::Cloud => "cloud_cover",
            Measurement::Pm2_5 => "pm2_5",
            Measurement::Pm10 => "pm10",
            Measurement::Co => "carbon_monoxide",
            Measurement::No2 => "nitrogen_dioxide",
            Measurement::O3 => "ozone",
            Measurement::So2 => "sulphur_dioxide",
        }
    }

    /// Accepts either the persisted or the upstream spelling
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.column_name() == name || m.upstream_name() == name)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One hour of raw readings, values aligned with [`RawObservations::measurements`]
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyReading {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Raw hourly records returned by a fetcher for one location, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservations {
    pub measurements: Vec<Measurement>,
    pub readings: Vec<HourlyReading>,
}

impl RawObservations {
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self {
            measurements,
            readings: Vec::new(),
        }
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, values: Vec<Option<f64>>) {
        self.readings.push(HourlyReading { timestamp, values });
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn position(&self, measurement: Measurement) -> Option<usize> {
        self.measurements.iter().position(|&m| m == measurement)
    }
}
