use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{ColumnData, Location, LocationSeries, ObservationTable, PollutionLevel};
use crate::utils::constants::{
    COL_CITY, COL_LAT, COL_LON, COL_POLLUTION_CLASS, COL_POLLUTION_LEVEL, COL_REGION, COL_TIMESTAMP,
};
use crate::utils::encoding::read_utf8_file;
use crate::utils::timestamps::{parse_optional_f64, parse_timestamp};

/// Loads a persisted table (`timestamp,city,lat,lon,...`) back into memory
pub struct TableReader {
    use_mmap: bool,
}

/// Rows of one city gathered while scanning the file
struct CityRows {
    location: Location,
    rows: Vec<(NaiveDateTime, Vec<String>)>,
}

impl TableReader {
    pub fn new() -> Self {
        Self { use_mmap: true }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read_table(&self, path: &Path) -> Result<ObservationTable> {
        let text = read_utf8_file(path, self.use_mmap)?;
        let table = self.parse_table(&text)?;
        info!(
            path = %path.display(),
            locations = table.location_count(),
            rows = table.row_count(),
            "Loaded persisted table"
        );
        Ok(table)
    }

    fn parse_table(&self, text: &str) -> Result<ObservationTable> {
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
        let (ts_idx, city_idx, lat_idx, lon_idx) =
            (index(COL_TIMESTAMP)?, index(COL_CITY)?, index(COL_LAT)?, index(COL_LON)?);

        let identity = [ts_idx, city_idx, lat_idx, lon_idx];
        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| !identity.contains(idx) && *name != COL_REGION)
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut cities: BTreeMap<String, CityRows> = BTreeMap::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("");

            let city = field(city_idx);
            if city.is_empty() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Row at {} has no city",
                    field(ts_idx)
                )));
            }

            let timestamp = parse_timestamp(field(ts_idx))?;
            let values = value_columns.iter().map(|(idx, _)| field(*idx).to_string()).collect();

            if !cities.contains_key(city) {
                let latitude = parse_coordinate(field(lat_idx), city)?;
                let longitude = parse_coordinate(field(lon_idx), city)?;
                cities.insert(
                    city.to_string(),
                    CityRows {
                        location: Location::new(city, latitude, longitude),
                        rows: Vec::new(),
                    },
                );
            }
            if let Some(entry) = cities.get_mut(city) {
                entry.rows.push((timestamp, values));
            }
        }

        let series = cities
            .into_values()
            .map(|city| build_series(city, &value_columns))
            .collect::<Result<Vec<_>>>()?;

        debug!(columns = value_columns.len(), "Parsed persisted table");
        ObservationTable::new(series)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_coordinate(value: &str, city: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| {
        ProcessingError::InvalidFormat(format!("Invalid coordinate '{}' for city '{}'", value, city))
    })
}

fn build_series(mut city: CityRows, value_columns: &[(usize, String)]) -> Result<LocationSeries> {
    city.rows.sort_by_key(|(ts, _)| *ts);
    if let Some(pair) = city.rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(ProcessingError::InvalidFormat(format!(
            "City '{}' has two rows for {}",
            city.location.name, pair[0].0
        )));
    }

    let (timestamps, slots) = hourly_slots(&city)?;
    let filled = slots.iter().filter(|slot| slot.is_none()).count();
    if filled > 0 {
        warn!(city = %city.location.name, hours = filled, "Filled missing hours with empty rows");
    }

    let rows = &city.rows;
    let mut series = LocationSeries::new(city.location, timestamps);

    for (position, (_, name)) in value_columns.iter().enumerate() {
        let cells = slots
            .iter()
            .map(|slot| slot.map_or("", |row| rows[row].1[position].as_str()));
        let data = match name.as_str() {
            COL_POLLUTION_LEVEL => ColumnData::Level(
                cells
                    .map(|cell| PollutionLevel::parse(cell).unwrap_or(PollutionLevel::Unknown))
                    .collect(),
            ),
            COL_POLLUTION_CLASS => ColumnData::Integer(
                cells
                    .map(|cell| parse_optional_f64(cell).map(|v| v.map(|x| x as i64)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            _ => ColumnData::Float(cells.map(parse_optional_f64).collect::<Result<Vec<_>>>()?),
        };
        series.insert_column(name, data)?;
    }

    Ok(series)
}

/// Dense hourly grid from a city's first to last row; each slot points at its source row, if any
fn hourly_slots(city: &CityRows) -> Result<(Vec<NaiveDateTime>, Vec<Option<usize>>)> {
    let mut timestamps = Vec::with_capacity(city.rows.len());
    let mut slots = Vec::with_capacity(city.rows.len());
    let Some(&(first, _)) = city.rows.first() else {
        return Ok((timestamps, slots));
    };

    for (row, (ts, _)) in city.rows.iter().enumerate() {
        let offset = *ts - first;
        if offset.num_seconds() % 3600 != 0 {
            return Err(ProcessingError::InvalidFormat(format!(
                "City '{}' has a row off the hourly grid at {}",
                city.location.name, ts
            )));
        }
        let slot = offset.num_hours() as usize;
        while timestamps.len() < slot {
            timestamps.push(first + Duration::hours(timestamps.len() as i64));
            slots.push(None);
        }
        timestamps.push(*ts);
        slots.push(Some(row));
    }

    Ok((timestamps, slots))
}
