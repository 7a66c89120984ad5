//! Domain models for the dosemate system.

mod concentration;
mod dose_unit;
mod drug;
mod incompatibility;
mod settings;

pub use concentration::*;
pub use dose_unit::*;
pub use drug::*;
pub use incompatibility::*;
pub use settings::*;
