pub mod aggregate;
pub mod histogram;
pub mod stats;
pub mod window;

pub use aggregate::AggregateCurve;
pub use histogram::Histogram;
pub use stats::Summary;
pub use window::{Signal, Window, WindowSet, WindowSpec, extract_windows};
