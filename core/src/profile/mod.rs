pub mod preset;
pub mod types;

pub use preset::lookup;
pub use types::{BatteryProfile, BatterySystem, BatteryType, SourcePriority, VoltageClass};
