pub mod concurrent_reader;
pub mod location_reader;
pub mod observation_reader;
pub mod source;
pub mod table_reader;

pub use concurrent_reader::ConcurrentReader;
pub use location_reader::LocationReader;
pub use observation_reader::ObservationReader;
pub use source::{DirectorySource, ObservationSource};
pub use table_reader::TableReader;
