pub mod band;
pub mod dataset;
pub mod raw;

pub use band::BandDescriptor;
pub use dataset::{Dataset, Variable};
pub use raw::{RawMoments, RawVariable};
