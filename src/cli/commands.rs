use chrono::Local;
use std::path::Path;
use tracing::{debug, warn};

use crate::cli::args::{Cli, Commands, PeriodArgs, SplitArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::processors::{HourlySkeleton, IntegrityChecker, IntegrityReport, PipelineProcessor};
use crate::readers::{DirectorySource, LocationReader, TableReader};
use crate::utils::filename::{generate_default_split_dir, generate_default_table_filename};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = PipelineConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Assemble {
            locations,
            raw_dir,
            output_file,
            period,
            validate_only,
        } => {
            let config = with_period(config, &period)?;
            let output_file = output_file.unwrap_or_else(generate_default_table_filename);

            println!("Assembling hourly observations...");
            println!("Locations: {}", locations.display());
            println!("Raw directory: {}", raw_dir.display());
            println!("Output file: {}", output_file.display());

            let (table_rows, summary) = tokio::task::spawn_blocking(move || -> Result<(usize, String)> {
                let skeleton = build_skeleton(&config)?;
                let roster = LocationReader::new().read_locations(&locations)?;
                let source = DirectorySource::new(raw_dir).with_mmap(true);
                let processor = PipelineProcessor::new(&config);

                let progress = ProgressReporter::new(roster.len() as u64, "Fetching locations...", false);
                let (table, report) = processor.assemble(&roster, &source, &skeleton, Some(&progress))?;
                progress.finish_with_message("Assembly complete");

                let summary = IntegrityChecker::with_skeleton(&skeleton).generate_summary(&report);
                if !validate_only {
                    CsvWriter::new().write_table(&table, &output_file)?;
                }
                Ok((table.row_count(), summary))
            })
            .await??;

            println!("\n{}", summary);
            if validate_only {
                println!("Validation complete - no output file written");
            } else {
                println!("Wrote {} rows", table_rows);
            }
        }

        Commands::Features {
            input,
            output_file,
            compression,
        } => {
            let compression = compression.unwrap_or_else(|| config.compression.clone());

            println!("Engineering features...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output_file.display());

            let output = output_file.clone();
            let rows = tokio::task::spawn_blocking(move || -> Result<usize> {
                let table = TableReader::new().read_table(&input)?;
                let processor = PipelineProcessor::new(&config);

                let progress = ProgressReporter::new_spinner("Engineering features...", false);
                let features = processor.engineer(table, Some(&progress))?;
                progress.finish_with_message("Features complete");

                ParquetWriter::new()
                    .with_compression(&compression)?
                    .write_table(&features, &output)?;
                Ok(features.row_count())
            })
            .await??;

            println!("Wrote {} rows", rows);
            print_file_info(&output_file)?;
        }

        Commands::Split {
            input,
            output_dir,
            split,
        } => {
            let config = with_split(config, &split)?;
            let output_dir = output_dir.unwrap_or_else(generate_default_split_dir);

            println!("Splitting feature table...");
            println!("Input file: {}", input.display());
            println!("Output directory: {}", output_dir.display());

            let summary = tokio::task::spawn_blocking(move || -> Result<String> {
                let table = TableReader::new().read_table(&input)?;
                let processor = PipelineProcessor::new(&config);

                let progress = ProgressReporter::new_spinner("Engineering features...", false);
                let features = processor.engineer(table, Some(&progress))?;
                let split = processor.split(features, Some(&progress))?;
                progress.finish_with_message("Split complete");

                let summary = ParquetWriter::new()
                    .with_compression(&config.compression)?
                    .write_split(&split, &output_dir)?;
                Ok(serde_json::to_string_pretty(&summary)?)
            })
            .await??;

            println!("\n{}", summary);
        }

        Commands::Process {
            locations,
            raw_dir,
            table_file,
            output_dir,
            period,
            split,
        } => {
            let config = with_split(with_period(config, &period)?, &split)?;
            let output_dir = output_dir.unwrap_or_else(generate_default_split_dir);

            println!("Processing air-quality data...");
            println!("Locations: {}", locations.display());
            println!("Raw directory: {}", raw_dir.display());
            println!("Output directory: {}", output_dir.display());
            println!("Workers: {}", config.max_workers);

            let (integrity, summary) = tokio::task::spawn_blocking(move || -> Result<(String, String)> {
                let skeleton = build_skeleton(&config)?;
                let roster = LocationReader::new().read_locations(&locations)?;
                let source = DirectorySource::new(raw_dir).with_mmap(true);
                let processor = PipelineProcessor::new(&config);

                let progress = ProgressReporter::new_spinner("Processing data...", false);
                let output = processor.run(&roster, &source, &skeleton, Some(&progress))?;

                if let Some(path) = table_file {
                    CsvWriter::new().write_table(&output.raw, &path)?;
                }
                let summary = ParquetWriter::new()
                    .with_compression(&config.compression)?
                    .write_split(&output.split, &output_dir)?;

                let integrity = IntegrityChecker::with_skeleton(&skeleton).generate_summary(&output.integrity);
                Ok((integrity, serde_json::to_string_pretty(&summary)?))
            })
            .await??;

            println!("\n{}", integrity);
            println!("{}", summary);
            println!("Processing complete!");
        }

        Commands::Validate {
            input,
            start_date,
            end_date,
        } => {
            println!("Validating persisted table...");
            println!("Input file: {}", input.display());

            let (report, summary) =
                tokio::task::spawn_blocking(move || -> Result<(IntegrityReport, String)> {
                    let table = TableReader::new().read_table(&input)?;
                    let skeleton = match (start_date, end_date) {
                        (Some(start), Some(end)) => Some(HourlySkeleton::new(start, end)?),
                        _ => None,
                    };
                    let checker = match &skeleton {
                        Some(skeleton) => IntegrityChecker::with_skeleton(skeleton),
                        None => IntegrityChecker::new(),
                    };
                    let report = checker.check_integrity(&table);
                    let summary = checker.generate_summary(&report);
                    Ok((report, summary))
                })
                .await??;

            println!("\n{}", summary);
            if report.is_complete_grid() {
                println!("✅ Every location has one row per hour");
            } else {
                warn!(violations = report.grid_violations.len(), "Grid violations found");
                println!("⚠️  {} grid violations found", report.grid_violations.len());
            }
        }

        Commands::Info { file } => {
            println!("Analyzing Parquet file: {}", file.display());
            print_file_info(&file)?;
        }
    }

    Ok(())
}

/// Fold study-period flags into the loaded configuration
fn with_period(mut config: PipelineConfig, period: &PeriodArgs) -> Result<PipelineConfig> {
    if let Some(start) = period.start_date {
        config.start_date = start;
    }
    if let Some(end) = period.end_date {
        config.end_date = Some(end);
    }
    if let Some(workers) = period.max_workers {
        config.max_workers = workers;
    }
    config.validate_all()?;
    Ok(config)
}

/// Fold split flags into the loaded configuration
fn with_split(mut config: PipelineConfig, split: &SplitArgs) -> Result<PipelineConfig> {
    if let Some(train) = split.train_ratio {
        config.train_ratio = train;
    }
    if let Some(val) = split.val_ratio {
        config.val_ratio = val;
    }
    if let Some(compression) = &split.compression {
        config.compression = compression.clone();
    }
    config.validate_all()?;
    Ok(config)
}

fn build_skeleton(config: &PipelineConfig) -> Result<HourlySkeleton> {
    let end = config.resolve_end_date(Local::now().date_naive());
    let skeleton = HourlySkeleton::new(config.start_date, end)?;
    debug!(start = %skeleton.start(), end = %skeleton.end(), hours = skeleton.len(), "Built skeleton");
    Ok(skeleton)
}

fn print_file_info(path: &Path) -> Result<()> {
    let file_info = ParquetWriter::new().get_file_info(path)?;
    println!("\n{}", file_info.summary());
    Ok(())
}
