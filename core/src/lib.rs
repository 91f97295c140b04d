//! Grid-resampling core for the multi-frequency radar moment fusion toolkit.
//!
//! The modules map irregular per-instrument time/range grids onto shared
//! reference grids via tolerance-bounded nearest-neighbor lookup, with the
//! surrounding merge, deduplication, offset, and unit-conversion steps.

pub mod math;
pub mod moments;
pub mod prelude;
pub mod resample;
pub mod telemetry;

pub use prelude::{MomentReader, MomentWriter, ResampleError, ResampleResult};
