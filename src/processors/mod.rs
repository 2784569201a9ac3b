pub mod classifier;
pub mod data_merger;
pub mod features;
pub mod integrity_checker;
pub mod pipeline;
pub mod skeleton;
pub mod splitter;

pub use classifier::RegionLabelClassifier;
pub use data_merger::DataMerger;
pub use features::{FeatureEngine, FeatureGroup};
pub use integrity_checker::{GridViolation, IntegrityChecker, IntegrityReport, LocationStatistics, ViolationType};
pub use pipeline::{PipelineOutput, PipelineProcessor};
pub use skeleton::{operational_end_date, HourlySkeleton};
pub use splitter::{SplitSummary, TemporalSplit, TemporalSplitter};
