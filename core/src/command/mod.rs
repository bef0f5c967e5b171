pub mod encoder;
pub mod format;
pub mod validate;

pub use encoder::{encode_battery_system, encode_command, reset_to_default, CommandRecord};
pub use format::{EnumCode, FixedDecimal, PaddedInt};
pub use validate::{validate, StepRange, VoltRange};
