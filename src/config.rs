use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::processors::skeleton::operational_end_date;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_END_LAG_DAYS, DEFAULT_TRAIN_RATIO, DEFAULT_VAL_RATIO, ENV_PREFIX,
};

/// Run settings shared by every command.
///
/// Sources, lowest priority first: built-in defaults, an optional TOML file,
/// then `AQI_PROCESSOR_*` environment variables. Command-line flags are
/// applied on top by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub start_date: NaiveDate,

    /// Last study date; `None` means today minus `end_lag_days`
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 0))]
    pub end_lag_days: i64,

    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub train_ratio: f64,

    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub val_ratio: f64,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub compression: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            end_date: None,
            end_lag_days: DEFAULT_END_LAG_DAYS,
            train_ratio: DEFAULT_TRAIN_RATIO,
            val_ratio: DEFAULT_VAL_RATIO,
            max_workers: num_cpus::get(),
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load from the optional file and the environment, then validate
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ProcessingError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate_all()?;
        Ok(config)
    }

    /// Field ranges plus the checks that span several fields
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;

        if self.train_ratio + self.val_ratio >= 1.0 {
            return Err(ProcessingError::Config(format!(
                "train_ratio + val_ratio must be below 1 (got {} + {})",
                self.train_ratio, self.val_ratio
            )));
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ProcessingError::Config(format!(
                    "end_date {} is before start_date {}",
                    end, self.start_date
                )));
            }
        }

        let known = [
            COMPRESSION_SNAPPY,
            COMPRESSION_GZIP,
            COMPRESSION_LZ4,
            COMPRESSION_ZSTD,
            COMPRESSION_NONE,
        ];
        if !known.contains(&self.compression.to_lowercase().as_str()) {
            return Err(ProcessingError::Config(format!(
                "Unknown compression '{}'",
                self.compression
            )));
        }

        Ok(())
    }

    /// Explicit end date, or the operational one relative to `today`
    pub fn resolve_end_date(&self, today: NaiveDate) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| operational_end_date(today, self.end_lag_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.compression, "snappy");
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "start_date = \"2020-01-01\"")?;
        writeln!(file, "end_date = \"2020-12-31\"")?;
        writeln!(file, "train_ratio = 0.7")?;
        writeln!(file, "max_workers = 2")?;

        let config = PipelineConfig::load(Some(file.path()))?;
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(config.train_ratio, 0.7);
        assert_eq!(config.val_ratio, 0.1);
        assert_eq!(config.max_workers, 2);
        Ok(())
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut config = PipelineConfig {
            train_ratio: 0.95,
            ..Default::default()
        };
        assert!(config.validate_all().is_err());

        config.train_ratio = 0.0;
        assert!(matches!(config.validate_all(), Err(ProcessingError::Validation(_))));

        config = PipelineConfig {
            end_date: NaiveDate::from_ymd_opt(2015, 1, 1),
            ..Default::default()
        };
        assert!(config.validate_all().is_err());

        config = PipelineConfig {
            compression: "brotli".to_string(),
            ..Default::default()
        };
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_resolve_end_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let config = PipelineConfig::default();
        assert_eq!(config.resolve_end_date(today), NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());

        let fixed = PipelineConfig {
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        assert_eq!(fixed.resolve_end_date(today), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }
}
