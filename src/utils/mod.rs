pub mod constants;
pub mod encoding;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod timestamps;

pub use constants::*;
pub use filename::{generate_default_split_dir, generate_default_table_filename};
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use timestamps::{format_timestamp, parse_timestamp};
