use chrono::NaiveDateTime;

use crate::error::{ProcessingError, Result};
use crate::models::{DayPart, Location, PollutionLevel, Region, Season};

/// Values of a single column. Missing cells are `None` (or `Unknown` for labels).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    DayPart(Vec<DayPart>),
    Season(Vec<Season>),
    Level(Vec<PollutionLevel>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::DayPart(v) => v.len(),
            ColumnData::Season(v) => v.len(),
            ColumnData::Level(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cell at `row` carries no value. A NaN float or an `Unknown` label counts as missing.
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::Float(v) => v[row].map_or(true, f64::is_nan),
            ColumnData::Integer(v) => v[row].is_none(),
            ColumnData::Level(v) => v[row] == PollutionLevel::Unknown,
            ColumnData::DayPart(_) | ColumnData::Season(_) => false,
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_null(row)).count()
    }

    pub fn as_float(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    /// All-missing column of the same kind
    pub fn empty_like(&self, len: usize) -> ColumnData {
        match self {
            ColumnData::Float(_) => ColumnData::Float(vec![None; len]),
            ColumnData::Integer(_) => ColumnData::Integer(vec![None; len]),
            ColumnData::DayPart(_) => ColumnData::DayPart(vec![DayPart::Night; len]),
            ColumnData::Season(_) => ColumnData::Season(vec![Season::Winter; len]),
            ColumnData::Level(_) => ColumnData::Level(vec![PollutionLevel::Unknown; len]),
        }
    }

    /// Keep only rows whose `keep` flag is set
    pub fn filter(&self, keep: &[bool]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, &k)| k)
                .map(|(v, _)| v.clone())
                .collect()
        }

        match self {
            ColumnData::Float(v) => ColumnData::Float(pick(v, keep)),
            ColumnData::Integer(v) => ColumnData::Integer(pick(v, keep)),
            ColumnData::DayPart(v) => ColumnData::DayPart(pick(v, keep)),
            ColumnData::Season(v) => ColumnData::Season(pick(v, keep)),
            ColumnData::Level(v) => ColumnData::Level(pick(v, keep)),
        }
    }

    /// Cell rendered for text output; missing cells render as an empty string
    pub fn format_cell(&self, row: usize) -> String {
        match self {
            ColumnData::Float(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            ColumnData::Integer(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            ColumnData::DayPart(v) => v[row].as_str().to_string(),
            ColumnData::Season(v) => v[row].as_str().to_string(),
            ColumnData::Level(v) => v[row].as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// One location's hourly series: strictly increasing timestamps and equal-length columns
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub location: Location,
    pub region: Option<Region>,
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl LocationSeries {
    pub fn new(location: Location, timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            location,
            region: None,
            timestamps,
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.location.name
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn float(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(ColumnData::as_float)
    }

    /// Numeric column that a computation depends on
    pub fn require_float(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name) {
            None => Err(ProcessingError::MissingColumn(name.to_string())),
            Some(data) => data.as_float().ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Column '{}' of '{}' is not numeric",
                    name,
                    self.name()
                ))
            }),
        }
    }

    /// Append a column, or replace an existing column of the same name in place
    pub fn insert_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.len() {
            return Err(ProcessingError::ColumnLength {
                column: name.to_string(),
                expected: self.len(),
                actual: data.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => self.columns.push(Column {
                name: name.to_string(),
                data,
            }),
        }
        Ok(())
    }

    /// Insert a column directly after `anchor` (or at the end when `anchor` is absent)
    pub fn insert_column_after(&mut self, anchor: &str, name: &str, data: ColumnData) -> Result<()> {
        if self.has_column(name) {
            return self.insert_column(name, data);
        }
        self.insert_column(name, data)?;
        if let Some(pos) = self.columns.iter().position(|c| c.name == anchor) {
            if let Some(column) = self.columns.pop() {
                self.columns.insert(pos + 1, column);
            }
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Option<ColumnData> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos).data)
    }

    /// A row is complete when every column has a value and the region is known
    pub fn row_is_complete(&self, row: usize) -> bool {
        self.region.is_some() && self.columns.iter().all(|c| !c.data.is_null(row))
    }

    /// Keep only rows whose `keep` flag is set
    pub fn filter_rows(&self, keep: &[bool]) -> LocationSeries {
        let timestamps = self
            .timestamps
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(ts, _)| *ts)
            .collect();

        LocationSeries {
            location: self.location.clone(),
            region: self.region,
            timestamps,
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.filter(keep),
                })
                .collect(),
        }
    }
}
