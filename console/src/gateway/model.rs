use serde::{Deserialize, Serialize};
use solcore::command::CommandRecord;
use solcore::flags::{format_wire, CLEAR};
use solcore::profile::BatterySystem;

/// Latest telemetry reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRow {
    /// Critical alarm byte in `\xHH` form.
    pub critical_alarms: String,
    /// Maintenance warning byte in `\xHH` form.
    pub maintenance_warnings: String,
    /// Normalised internal battery resistance in ohms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
}

impl Default for TelemetryRow {
    fn default() -> Self {
        Self {
            critical_alarms: format_wire(CLEAR),
            maintenance_warnings: format_wire(CLEAR),
            resistance: None,
        }
    }
}

/// Everything stored for one device id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_system: Option<BatterySystem>,
}
