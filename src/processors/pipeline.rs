use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{Location, ObservationTable};
use crate::processors::features::FeatureEngine;
use crate::processors::skeleton::HourlySkeleton;
use crate::processors::splitter::{TemporalSplit, TemporalSplitter};
use crate::processors::{DataMerger, IntegrityChecker, IntegrityReport, RegionLabelClassifier};
use crate::readers::{ConcurrentReader, ObservationSource};
use crate::utils::progress::ProgressReporter;

/// Everything one end-to-end run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw: ObservationTable,
    pub integrity: IntegrityReport,
    pub split: TemporalSplit,
}

/// Drives skeleton → fetch → merge → label → features → split
pub struct PipelineProcessor {
    max_workers: usize,
    train_ratio: f64,
    val_ratio: f64,
}

impl PipelineProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            train_ratio: config.train_ratio,
            val_ratio: config.val_ratio,
        }
    }

    /// Fetch every location, align it to the skeleton and merge into the labelled raw table
    pub fn assemble(
        &self,
        locations: &[Location],
        source: &dyn ObservationSource,
        skeleton: &HourlySkeleton,
        progress: Option<&ProgressReporter>,
    ) -> Result<(ObservationTable, IntegrityReport)> {
        if let Some(p) = progress {
            p.set_message(&format!("Fetching {} locations...", locations.len()));
        }
        let reader = ConcurrentReader::new(self.max_workers);
        let series = reader.read_all(locations, source, skeleton, progress)?;

        if let Some(p) = progress {
            p.set_message("Merging locations...");
        }
        let merged = DataMerger::new().merge_locations(series)?;
        let table = RegionLabelClassifier::new().apply(merged)?;

        if let Some(p) = progress {
            p.set_message("Checking grid integrity...");
        }
        let report = IntegrityChecker::with_skeleton(skeleton).check_integrity(&table);

        info!(
            locations = table.location_count(),
            rows = table.row_count(),
            columns = table.column_names().len(),
            complete_grid = report.is_complete_grid(),
            "Assembled raw table"
        );
        Ok((table, report))
    }

    /// Region tags, pollution labels and all four feature groups
    pub fn engineer(&self, table: ObservationTable, progress: Option<&ProgressReporter>) -> Result<ObservationTable> {
        let labelled = RegionLabelClassifier::new().apply(table)?;
        FeatureEngine::new().apply(labelled, progress)
    }

    pub fn split(&self, table: ObservationTable, progress: Option<&ProgressReporter>) -> Result<TemporalSplit> {
        if let Some(p) = progress {
            p.set_message("Splitting by time...");
        }
        TemporalSplitter::with_ratios(self.train_ratio, self.val_ratio)?.split(table)
    }

    pub fn run(
        &self,
        locations: &[Location],
        source: &dyn ObservationSource,
        skeleton: &HourlySkeleton,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        let (raw, integrity) = self.assemble(locations, source, skeleton, progress)?;
        let features = self.engineer(raw.clone(), progress)?;
        let split = self.split(features, progress)?;

        if let Some(p) = progress {
            p.finish_with_message("Processing complete");
        }
        Ok(PipelineOutput { raw, integrity, split })
    }
}

impl Default for PipelineProcessor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::{Measurement, RawObservations};
    use chrono::{Duration, NaiveDate};

    /// Deterministic hourly readings for every measurement over the request range
    struct SyntheticSource;

    impl ObservationSource for SyntheticSource {
        fn fetch(&self, location: &Location, start: NaiveDate, end: NaiveDate) -> Result<RawObservations> {
            if location.name == "Atlantis" {
                return Err(ProcessingError::Fetch {
                    location: location.name.clone(),
                    message: "no such place".to_string(),
                });
            }
            let mut raw = RawObservations::new(Measurement::ALL.to_vec());
            let mut ts = start.and_hms_opt(0, 0, 0).unwrap_or_default();
            let last = end.and_hms_opt(0, 0, 0).unwrap_or_default();
            let mut h = 0.0;
            while ts <= last {
                let values = (0..Measurement::ALL.len())
                    .map(|i| Some(10.0 + i as f64 + (h % 24.0)))
                    .collect();
                raw.push(ts, values);
                ts += Duration::hours(1);
                h += 1.0;
            }
            Ok(raw)
        }
    }

    #[test]
    fn test_end_to_end_run() -> Result<()> {
        let skeleton = HourlySkeleton::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )?;
        let locations = vec![
            Location::new("Hà Nội", 21.03, 105.85),
            Location::new("Cần Thơ", 10.03, 105.78),
            Location::new("Atlantis", 0.0, 0.0),
        ];

        let output = PipelineProcessor::default().run(&locations, &SyntheticSource, &skeleton, None)?;

        assert_eq!(output.raw.location_count(), 3);
        assert_eq!(output.raw.row_count(), 3 * skeleton.len());
        assert!(output.integrity.is_complete_grid());

        let split = &output.split;
        assert!(split.train_cut < split.val_cut);
        for part in [&split.train, &split.validation, &split.test] {
            assert!(part.get("Atlantis").is_none());
            assert!(part.has_column("target_future"));
        }
        assert!(split.train.distinct_timestamps().iter().all(|&ts| ts < split.train_cut));
        assert!(split.test.distinct_timestamps().iter().all(|&ts| ts >= split.val_cut));
        Ok(())
    }
}
