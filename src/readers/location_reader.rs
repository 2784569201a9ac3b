use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::Location;
use crate::utils::encoding::read_utf8_file;

/// Reads the geocoded location roster (`name,lat,lon`)
pub struct LocationReader {
    validate: bool,
}

impl LocationReader {
    pub fn new() -> Self {
        Self { validate: true }
    }

    pub fn with_validation(validate: bool) -> Self {
        Self { validate }
    }

    pub fn read_locations(&self, path: &Path) -> Result<Vec<Location>> {
        let text = read_utf8_file(path, false)?;
        self.parse_locations(&text)
    }

    fn parse_locations(&self, text: &str) -> Result<Vec<Location>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let index = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ProcessingError::MissingColumn(name.to_string()))
        };
        let (name_idx, lat_idx, lon_idx) = (index("name")?, index("lat")?, index("lon")?);

        let mut locations = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let field = |idx: usize| record.get(idx).unwrap_or("");
            let coordinate = |idx: usize| {
                field(idx).parse::<f64>().map_err(|_| {
                    ProcessingError::InvalidFormat(format!(
                        "Invalid coordinate '{}' for location '{}'",
                        field(idx),
                        field(name_idx)
                    ))
                })
            };

            let location = Location::new(field(name_idx), coordinate(lat_idx)?, coordinate(lon_idx)?);
            if self.validate {
                location.validate()?;
            }
            locations.push(location);
        }

        Ok(locations)
    }
}

impl Default for LocationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_locations_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"\xEF\xBB\xBF")?;
        writeln!(temp_file, "name,lat,lon")?;
        writeln!(temp_file, "Hà Nội,21.0283334,105.854041")?;
        writeln!(temp_file, "Hồ Chí Minh, 10.7763897 , 106.7011391")?;

        let locations = LocationReader::new().read_locations(temp_file.path())?;

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].name, "Hà Nội");
        assert!((locations[0].latitude - 21.0283334).abs() < 1e-9);
        assert_eq!(locations[1].name, "Hồ Chí Minh");
        assert!((locations[1].longitude - 106.7011391).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_invalid_rows() {
        let reader = LocationReader::new();
        assert!(reader.parse_locations("name,lat,lon\nHuế,abc,107.5\n").is_err());
        assert!(reader.parse_locations("name,lat,lon\nHuế,95.0,107.5\n").is_err());
        assert!(matches!(
            reader.parse_locations("name,latitude\nHuế,16.4\n"),
            Err(ProcessingError::MissingColumn(_))
        ));

        let lenient = LocationReader::with_validation(false);
        assert_eq!(lenient.parse_locations("name,lat,lon\nHuế,95.0,107.5\n").unwrap().len(), 1);
    }
}
