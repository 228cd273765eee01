pub mod events;
pub mod table;
pub mod timeseries;

pub use events::{EventRecord, EventTable};
pub use timeseries::{MemorySource, RunDirSource, SeriesSource, TimeSeries};
