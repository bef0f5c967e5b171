pub use crate::command::{encode_battery_system, encode_command, reset_to_default, CommandRecord};
pub use crate::flags::{AlarmFlag, CriticalAlarm, FlagSet, MaintenanceWarning};
pub use crate::profile::{BatteryProfile, BatterySystem, BatteryType, SourcePriority, VoltageClass};
pub use crate::soh::{SohCategory, SohEstimate, SugenoSystem};

/// Common error type for every core operation.
///
/// All variants are recoverable at the call site; the core never retries.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown voltage class: {0}")]
    Domain(String),
    #[error("value out of range: {0}")]
    Range(String),
    #[error("malformed bitmask: {0}")]
    Format(String),
    #[error("no fuzzy rule fired, health estimate undefined")]
    InferenceUndefined,
}

pub type CoreResult<T> = Result<T, CoreError>;
