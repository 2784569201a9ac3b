use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aqi-processor")]
#[command(about = "Hourly air-quality feature pipeline with chronological train/validation/test splits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

/// Study period and fetch settings; unset flags fall back to the configuration
#[derive(Args, Clone, Debug, Default)]
pub struct PeriodArgs {
    #[arg(long, help = "First study date (YYYY-MM-DD) [default: 2016-01-01]")]
    pub start_date: Option<NaiveDate>,

    #[arg(long, help = "Last study date (YYYY-MM-DD) [default: today minus the end lag]")]
    pub end_date: Option<NaiveDate>,

    #[arg(long, help = "Concurrent location fetches [default: number of CPUs]")]
    pub max_workers: Option<usize>,
}

/// Split ratios; unset flags fall back to the configuration
#[derive(Args, Clone, Debug, Default)]
pub struct SplitArgs {
    #[arg(long, help = "Share of distinct timestamps before the train cut [default: 0.8]")]
    pub train_ratio: Option<f64>,

    #[arg(long, help = "Share of distinct timestamps between the cuts [default: 0.1]")]
    pub val_ratio: Option<f64>,

    #[arg(short, long, help = "Parquet compression: snappy, gzip, lz4, zstd or none")]
    pub compression: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the persisted raw table from a location roster and per-location raw files
    Assemble {
        #[arg(short, long, help = "Location roster CSV (name,lat,lon)")]
        locations: PathBuf,

        #[arg(short, long, help = "Directory holding one <location>.csv per location")]
        raw_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output CSV path [default: data/aqi-raw-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[command(flatten)]
        period: PeriodArgs,

        #[arg(long, default_value = "false")]
        validate_only: bool,
    },

    /// Add region tags, labels and all engineered features to a persisted table
    Features {
        #[arg(short, long, help = "Persisted raw table CSV")]
        input: PathBuf,

        #[arg(short, long, help = "Output Parquet file")]
        output_file: PathBuf,

        #[arg(short, long, help = "Parquet compression: snappy, gzip, lz4, zstd or none")]
        compression: Option<String>,
    },

    /// Engineer features on a persisted table and write train/val/test Parquet files
    Split {
        #[arg(short, long, help = "Persisted raw table CSV")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output directory [default: output/aqi-split-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Assemble, engineer and split in one run
    Process {
        #[arg(short, long, help = "Location roster CSV (name,lat,lon)")]
        locations: PathBuf,

        #[arg(short, long, help = "Directory holding one <location>.csv per location")]
        raw_dir: PathBuf,

        #[arg(long, help = "Also persist the raw table to this CSV")]
        table_file: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output directory [default: output/aqi-split-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Check the hourly grid of a persisted table
    Validate {
        #[arg(short, long, help = "Persisted raw table CSV")]
        input: PathBuf,

        #[arg(long, help = "Also require every location to start on this date", requires = "end_date")]
        start_date: Option<NaiveDate>,

        #[arg(long, help = "Also require every location to end on this date", requires = "start_date")]
        end_date: Option<NaiveDate>,
    },

    /// Display information about a Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process() {
        let cli = Cli::try_parse_from([
            "aqi-processor",
            "process",
            "--locations",
            "locations.csv",
            "--raw-dir",
            "raw",
            "--start-date",
            "2020-01-01",
            "--train-ratio",
            "0.7",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Process { period, split, .. } => {
                assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
                assert_eq!(split.train_ratio, Some(0.7));
                assert_eq!(split.val_ratio, None);
            }
            _ => panic!("expected process command"),
        }
    }
}
