use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use solcore::profile::{BatteryProfile, BatteryType, SourcePriority, VoltageClass};
use std::fs;
use std::path::Path;

/// A settings submission, as saved from the dashboard's settings form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettingsFile {
    pub device: String,
    /// Falls back to the device's registered battery system when absent.
    #[serde(default)]
    pub voltage: Option<VoltageClass>,
    /// Ask the inverter to restore its own defaults.
    #[serde(default)]
    pub factory_reset: bool,
    #[serde(default)]
    pub overrides: ProfileOverrides,
}

/// Fields the user changed; everything else keeps its current value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
    pub source_priority: Option<SourcePriority>,
    pub battery_type: Option<BatteryType>,
    pub buzzer: Option<bool>,
    pub overload_bypass: Option<bool>,
    pub over_temp_restart: Option<bool>,
    pub backlight: Option<bool>,
    pub source_interrupt_alarm: Option<bool>,
    pub utility_max_current: Option<u16>,
    pub solar_max_current: Option<u16>,
    pub cutoff_voltage: Option<f64>,
    pub charging_voltage: Option<f64>,
    pub float_voltage: Option<f64>,
    pub low_voltage_alarm: Option<f64>,
    pub low_ac_alarm: Option<u16>,
    pub high_ac_load_alarm: Option<u16>,
    pub high_discharge_alarm: Option<u16>,
}

impl ProfileOverrides {
    pub fn apply(&self, base: &BatteryProfile) -> BatteryProfile {
        BatteryProfile {
            source_priority: self.source_priority.unwrap_or(base.source_priority),
            battery_type: self.battery_type.unwrap_or(base.battery_type),
            buzzer: self.buzzer.unwrap_or(base.buzzer),
            overload_bypass: self.overload_bypass.unwrap_or(base.overload_bypass),
            over_temp_restart: self.over_temp_restart.unwrap_or(base.over_temp_restart),
            backlight: self.backlight.unwrap_or(base.backlight),
            source_interrupt_alarm: self
                .source_interrupt_alarm
                .unwrap_or(base.source_interrupt_alarm),
            utility_max_current: self.utility_max_current.unwrap_or(base.utility_max_current),
            solar_max_current: self.solar_max_current.unwrap_or(base.solar_max_current),
            cutoff_voltage: self.cutoff_voltage.unwrap_or(base.cutoff_voltage),
            charging_voltage: self.charging_voltage.unwrap_or(base.charging_voltage),
            float_voltage: self.float_voltage.unwrap_or(base.float_voltage),
            low_voltage_alarm: self.low_voltage_alarm.unwrap_or(base.low_voltage_alarm),
            low_ac_alarm: self.low_ac_alarm.unwrap_or(base.low_ac_alarm),
            high_ac_load_alarm: self.high_ac_load_alarm.unwrap_or(base.high_ac_load_alarm),
            high_discharge_alarm: self.high_discharge_alarm.unwrap_or(base.high_discharge_alarm),
        }
    }
}

impl SettingsFile {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading settings {}", path_ref.display()))?;
        let settings: SettingsFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing settings {}", path_ref.display()))?;
        check_device_id(&settings.device)?;
        Ok(settings)
    }
}

/// Device ids are `inv` followed by three digits.
pub fn check_device_id(id: &str) -> anyhow::Result<()> {
    let valid = id.len() == 6
        && id.starts_with("inv")
        && id[3..].bytes().all(|b| b.is_ascii_digit());
    ensure!(valid, "invalid device id {:?}, expected inv###", id);
    Ok(())
}
