pub mod calendar;
pub mod location;
pub mod observation;
pub mod pollution;
pub mod region;
pub mod series;
pub mod table;

pub use calendar::{DayPart, Season};
pub use location::Location;
pub use observation::{HourlyReading, Measurement, RawObservations};
pub use pollution::{pollution_class, pollution_level, PollutionLevel};
pub use region::{classify_region, Region};
pub use series::{Column, ColumnData, LocationSeries};
pub use table::ObservationTable;
