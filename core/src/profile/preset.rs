use crate::prelude::CoreResult;
use crate::profile::types::{BatteryProfile, BatteryType, SourcePriority, VoltageClass};

/// Fields shared by every preset; only the currents and voltages scale.
const BASE: BatteryProfile = BatteryProfile {
    source_priority: SourcePriority::UtilityFirst,
    battery_type: BatteryType::Flooded,
    buzzer: false,
    overload_bypass: false,
    over_temp_restart: false,
    backlight: false,
    source_interrupt_alarm: false,
    utility_max_current: 0,
    solar_max_current: 0,
    cutoff_voltage: 0.0,
    charging_voltage: 0.0,
    float_voltage: 0.0,
    low_voltage_alarm: 0.0,
    low_ac_alarm: 176,
    high_ac_load_alarm: 85,
    high_discharge_alarm: 100,
};

const PRESET_12V: BatteryProfile = BatteryProfile {
    utility_max_current: 30,
    solar_max_current: 20,
    cutoff_voltage: 10.5,
    charging_voltage: 14.4,
    float_voltage: 13.5,
    low_voltage_alarm: 11.0,
    ..BASE
};

const PRESET_24V: BatteryProfile = BatteryProfile {
    utility_max_current: 40,
    solar_max_current: 30,
    cutoff_voltage: 21.0,
    charging_voltage: 28.8,
    float_voltage: 27.0,
    low_voltage_alarm: 22.0,
    ..BASE
};

const PRESET_48V: BatteryProfile = BatteryProfile {
    utility_max_current: 50,
    solar_max_current: 40,
    cutoff_voltage: 42.0,
    charging_voltage: 57.6,
    float_voltage: 54.0,
    low_voltage_alarm: 44.0,
    ..BASE
};

impl VoltageClass {
    /// Factory defaults for this class.
    pub fn preset(self) -> &'static BatteryProfile {
        match self {
            VoltageClass::V12 => &PRESET_12V,
            VoltageClass::V24 => &PRESET_24V,
            VoltageClass::V48 => &PRESET_48V,
        }
    }
}

/// Factory defaults for a nominal voltage given in volts.
pub fn lookup(volts: u16) -> CoreResult<&'static BatteryProfile> {
    VoltageClass::try_from(volts).map(VoltageClass::preset)
}
