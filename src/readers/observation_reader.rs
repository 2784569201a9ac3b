use std::path::Path;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Measurement, RawObservations};
use crate::utils::encoding::read_utf8_file;
use crate::utils::timestamps::{parse_optional_f64, parse_timestamp};

/// Reads one location's raw hourly records as written by the fetcher.
///
/// Expects a `time` (or `timestamp`) column plus any measurement columns under
/// their persisted or upstream names. Other columns are ignored.
pub struct ObservationReader {
    use_mmap: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read_observations(&self, path: &Path) -> Result<RawObservations> {
        let text = read_utf8_file(path, self.use_mmap)?;
        self.parse_observations(&text)
            .map_err(|e| ProcessingError::InvalidFormat(format!("{}: {}", path.display(), e)))
    }

    fn parse_observations(&self, text: &str) -> Result<RawObservations> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let time_idx = headers
            .iter()
            .position(|h| h == "time" || h == "timestamp")
            .ok_or_else(|| ProcessingError::MissingColumn("time".to_string()))?;

        let mut measurements = Vec::new();
        let mut indices = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(measurement) = Measurement::from_column_name(header) {
                if !measurements.contains(&measurement) {
                    measurements.push(measurement);
                    indices.push(idx);
                }
            }
        }

        let mut raw = RawObservations::new(measurements);
        for record in reader.records() {
            let record = record?;
            let timestamp = parse_timestamp(record.get(time_idx).unwrap_or(""))?;
            let values = indices
                .iter()
                .map(|&idx| parse_optional_f64(record.get(idx).unwrap_or("")))
                .collect::<Result<Vec<_>>>()?;
            raw.push(timestamp, values);
        }

        debug!(
            rows = raw.len(),
            measurements = raw.measurements.len(),
            "Parsed raw observations"
        );
        Ok(raw)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_upstream_column_names() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "time,us_aqi,pm2_5,temperature_2m,precipitation,city")?;
        writeln!(file, "2024-01-01T00:00,55,21.3,18.2,0.0,Huế")?;
        writeln!(file, "2024-01-01T01:00,,19.8,17.9,0.4,Huế")?;

        for reader in [ObservationReader::new(), ObservationReader::with_mmap(true)] {
            let raw = reader.read_observations(file.path())?;
            assert_eq!(
                raw.measurements,
                vec![Measurement::Aqi, Measurement::Pm2_5, Measurement::Temp, Measurement::Rain]
            );
            assert_eq!(raw.len(), 2);
            assert_eq!(
                raw.readings[1].timestamp,
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(1, 0, 0)
                    .unwrap()
            );
            assert_eq!(raw.readings[1].values, vec![None, Some(19.8), Some(17.9), Some(0.4)]);
        }
        Ok(())
    }

    #[test]
    fn test_missing_time_column() {
        let reader = ObservationReader::new();
        assert!(matches!(
            reader.parse_observations("pm2_5\n1.0\n"),
            Err(ProcessingError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_file() {
        let raw = ObservationReader::new()
            .parse_observations("time,pm10\n")
            .unwrap();
        assert_eq!(raw.measurements, vec![Measurement::Pm10]);
        assert!(raw.is_empty());
    }
}
