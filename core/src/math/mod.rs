pub mod units;

pub use units::UnitConverter;
