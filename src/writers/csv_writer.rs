use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::ObservationTable;
use crate::utils::constants::{COL_CITY, COL_LAT, COL_LON, COL_TIMESTAMP};
use crate::utils::timestamps::format_timestamp;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the persisted raw table: `timestamp,city,lat,lon` followed by the
/// table's columns, rows in (timestamp, city) order, UTF-8 with a BOM.
pub struct CsvWriter {
    write_bom: bool,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { write_bom: true }
    }

    pub fn with_bom(write_bom: bool) -> Self {
        Self { write_bom }
    }

    pub fn write_table(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = BufWriter::new(File::create(path)?);
        if self.write_bom {
            file.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::Writer::from_writer(file);
        let columns = table.column_names();

        let mut header = vec![COL_TIMESTAMP, COL_CITY, COL_LAT, COL_LON];
        header.extend(columns.iter().copied());
        writer.write_record(&header)?;

        let series = table.series();
        let order = table.row_order();
        for &(s, r) in &order {
            let current = &series[s];
            let mut record = Vec::with_capacity(header.len());
            record.push(format_timestamp(&current.timestamps()[r]));
            record.push(current.name().to_string());
            record.push(current.location.latitude.to_string());
            record.push(current.location.longitude.to_string());
            record.extend(current.columns().iter().map(|c| c.data.format_cell(r)));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            rows = order.len(),
            columns = header.len(),
            "Wrote persisted table"
        );
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnData, Location, LocationSeries, PollutionLevel};
    use crate::readers::TableReader;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table() -> ObservationTable {
        let t0 = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let make = |name: &str, aqi: [Option<f64>; 2]| {
            let mut s = LocationSeries::new(Location::new(name, 10.5, 105.1), vec![t0, t0 + Duration::hours(1)]);
            s.insert_column("aqi", ColumnData::Float(aqi.to_vec())).unwrap();
            s.insert_column(
                "pollution_level",
                ColumnData::Level(aqi.iter().map(|&a| crate::models::pollution_level(a)).collect()),
            )
            .unwrap();
            s.insert_column(
                "pollution_class",
                ColumnData::Integer(
                    aqi.iter()
                        .map(|&a| crate::models::pollution_class(a).map(i64::from))
                        .collect(),
                ),
            )
            .unwrap();
            s.insert_column("pm2_5", ColumnData::Float(vec![Some(12.25), None])).unwrap();
            s
        };
        ObservationTable::new(vec![make("Sóc Trăng", [Some(42.0), None]), make("An Giang", [Some(160.0), Some(75.0)])])
            .unwrap()
    }

    #[test]
    fn test_layout_and_order() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("raw.csv");
        CsvWriter::new().write_table(&table(), &path)?;

        let bytes = std::fs::read(&path)?;
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,city,lat,lon,aqi,pollution_level,pollution_class,pm2_5");
        assert_eq!(lines[1], "2024-02-10T00:00,An Giang,10.5,105.1,160,Unhealthy,3,12.25");
        assert_eq!(lines[2], "2024-02-10T00:00,Sóc Trăng,10.5,105.1,42,Good,0,12.25");
        assert_eq!(lines[4], "2024-02-10T01:00,Sóc Trăng,10.5,105.1,,Unknown,,");
        Ok(())
    }

    #[test]
    fn test_persisted_table_reloads() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("raw.csv");
        let original = table();
        CsvWriter::new().write_table(&original, &path)?;

        let reloaded = TableReader::new().read_table(&path)?;
        assert_eq!(reloaded, original);
        assert_eq!(
            reloaded.get("An Giang").unwrap().column("pollution_level"),
            Some(&ColumnData::Level(vec![PollutionLevel::Unhealthy, PollutionLevel::Moderate]))
        );
        Ok(())
    }
}
