use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::{ColumnData, ObservationTable, PollutionLevel};
use crate::processors::splitter::{SplitSummary, TemporalSplit};
use crate::utils::constants::{
    COL_CITY, COL_LAT, COL_LON, COL_REGION, COL_TIMESTAMP, DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE,
    SPLIT_SUMMARY_FILE, TEST_FILE, TRAIN_FILE, VALIDATION_FILE,
};

/// Writes observation tables as Parquet, one row per (location, hour).
///
/// Layout: `timestamp` (seconds, naive local time), `city`, `lat`, `lon`,
/// `region`, then the table's columns. Floats become nullable `Float64`,
/// integers `Int64`, categorical columns `Utf8`.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Write the whole table in (timestamp, city) order
    pub fn write_table(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let schema = self.create_schema(table);
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        let order = table.row_order();
        for chunk in order.chunks(self.batch_size) {
            let batch = self.rows_to_batch(table, chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        debug!(path = %path.display(), rows = order.len(), "Wrote Parquet table");
        Ok(())
    }

    /// Write the three partitions and the boundary summary into `dir`
    pub fn write_split(&self, split: &TemporalSplit, dir: &Path) -> Result<SplitSummary> {
        std::fs::create_dir_all(dir)?;

        self.write_table(&split.train, &dir.join(TRAIN_FILE))?;
        self.write_table(&split.validation, &dir.join(VALIDATION_FILE))?;
        self.write_table(&split.test, &dir.join(TEST_FILE))?;

        let summary = split.summary();
        let file = File::create(dir.join(SPLIT_SUMMARY_FILE))?;
        serde_json::to_writer_pretty(file, &summary)?;

        info!(
            dir = %dir.display(),
            train = summary.train_rows,
            validation = summary.validation_rows,
            test = summary.test_rows,
            "Wrote split"
        );
        Ok(summary)
    }

    fn create_schema(&self, table: &ObservationTable) -> SchemaRef {
        let mut fields = vec![
            Field::new(COL_TIMESTAMP, DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new(COL_CITY, DataType::Utf8, false),
            Field::new(COL_LAT, DataType::Float64, false),
            Field::new(COL_LON, DataType::Float64, false),
            Field::new(COL_REGION, DataType::Utf8, true),
        ];

        if let Some(first) = table.series().first() {
            for column in first.columns() {
                let data_type = match column.data {
                    ColumnData::Float(_) => DataType::Float64,
                    ColumnData::Integer(_) => DataType::Int64,
                    ColumnData::DayPart(_) | ColumnData::Season(_) | ColumnData::Level(_) => DataType::Utf8,
                };
                fields.push(Field::new(&column.name, data_type, true));
            }
        }

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(
        &self,
        table: &ObservationTable,
        rows: &[(usize, usize)],
        schema: SchemaRef,
    ) -> Result<RecordBatch> {
        let series = table.series();

        let timestamps: Vec<i64> = rows
            .iter()
            .map(|&(s, r)| series[s].timestamps()[r].and_utc().timestamp())
            .collect();
        let cities: Vec<&str> = rows.iter().map(|&(s, _)| series[s].name()).collect();
        let lats: Vec<f64> = rows.iter().map(|&(s, _)| series[s].location.latitude).collect();
        let lons: Vec<f64> = rows.iter().map(|&(s, _)| series[s].location.longitude).collect();
        let regions: Vec<Option<&str>> = rows
            .iter()
            .map(|&(s, _)| series[s].region.map(|region| region.label()))
            .collect();

        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(TimestampSecondArray::from(timestamps)),
            Arc::new(StringArray::from(cities)),
            Arc::new(Float64Array::from(lats)),
            Arc::new(Float64Array::from(lons)),
            Arc::new(StringArray::from(regions)),
        ];

        let width = series.first().map_or(0, |s| s.columns().len());
        for col in 0..width {
            let cell = move |&(s, r): &(usize, usize)| (&series[s].columns()[col].data, r);
            let template = &series[0].columns()[col].data;

            let array: ArrayRef = match template {
                ColumnData::Float(_) => Arc::new(Float64Array::from(
                    rows.iter()
                        .map(|row| match cell(row) {
                            (ColumnData::Float(v), r) => v[r].filter(|x| !x.is_nan()),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )),
                ColumnData::Integer(_) => Arc::new(Int64Array::from(
                    rows.iter()
                        .map(|row| match cell(row) {
                            (ColumnData::Integer(v), r) => v[r],
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )),
                ColumnData::DayPart(_) | ColumnData::Season(_) | ColumnData::Level(_) => {
                    Arc::new(StringArray::from(
                        rows.iter()
                            .map(|row| match cell(row) {
                                (ColumnData::DayPart(v), r) => Some(v[r].as_str()),
                                (ColumnData::Season(v), r) => Some(v[r].as_str()),
                                (ColumnData::Level(v), r) if v[r] != PollutionLevel::Unknown => {
                                    Some(v[r].as_str())
                                }
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                    ))
                }
            };
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
            columns: read_schema(path)?,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Column names and Arrow types of a Parquet file
pub fn read_schema(path: &Path) -> Result<Vec<(String, String)>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    Ok(builder
        .schema()
        .fields()
        .iter()
        .map(|field| (field.name().clone(), field.data_type().to_string()))
        .collect())
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<(String, String)>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        let mut summary = format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}\n\
            - Columns: {}\n",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows,
            self.columns.len()
        );
        for (name, data_type) in &self.columns {
            summary.push_str(&format!("    {:<20} {}\n", name, data_type));
        }
        summary
    }
}
