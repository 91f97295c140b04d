pub mod axis;
pub mod delta;
pub mod grid;
pub mod nearest;
pub mod pipeline;

pub use axis::AxisResampler;
pub use delta::DeltaComputer;
pub use grid::ReferenceGrid;
pub use nearest::{IndexMap, NearestIndexResolver};
pub use pipeline::{DatasetResampler, MergeReport, SkippedFile};
