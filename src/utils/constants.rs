/// Identity columns of the persisted table
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_CITY: &str = "city";
pub const COL_LAT: &str = "lat";
pub const COL_LON: &str = "lon";
pub const COL_REGION: &str = "region";

/// Label columns derived from the AQI
pub const COL_POLLUTION_LEVEL: &str = "pollution_level";
pub const COL_POLLUTION_CLASS: &str = "pollution_class";

/// Forecast target produced by the splitter
pub const COL_TARGET: &str = "target_future";

/// Timestamp formats
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const TIMESTAMP_FORMAT_ALT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Study period defaults
pub const DEFAULT_START_DATE: &str = "2016-01-01";
pub const DEFAULT_END_LAG_DAYS: i64 = 5;

/// AQI breakpoints (inclusive upper bounds) for classes 0..=4; anything above is class 5
pub const AQI_BREAKPOINTS: [f64; 5] = [50.0, 100.0, 150.0, 200.0, 300.0];

/// Temporal feature constants
pub const HOURS_PER_DAY: f64 = 24.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;
pub const RUSH_HOURS: [u32; 6] = [7, 8, 9, 17, 18, 19];
pub const WEEKEND_FIRST_DAY: u32 = 5; // Monday = 0

/// Look-back windows (hours)
pub const RAIN_WINDOW_HOURS: usize = 6;
pub const TEMP_RANGE_WINDOW_HOURS: usize = 24;
pub const SHORT_ROLLING_HOURS: usize = 6;
pub const LONG_ROLLING_HOURS: usize = 24;
pub const PM25_LAGS: [usize; 4] = [1, 2, 3, 24];

/// Guards the fine/coarse ratio against division by zero
pub const PM_RATIO_EPSILON: f64 = 1e-6;

/// Split defaults
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;
pub const DEFAULT_VAL_RATIO: f64 = 0.1;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Output file names
pub const SPLIT_SUMMARY_FILE: &str = "split.json";
pub const TRAIN_FILE: &str = "train.parquet";
pub const VALIDATION_FILE: &str = "val.parquet";
pub const TEST_FILE: &str = "test.parquet";

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "AQI_PROCESSOR";
