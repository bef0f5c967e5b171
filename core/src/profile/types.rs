use crate::prelude::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nominal battery bank voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum VoltageClass {
    V12,
    V24,
    V48,
}

impl VoltageClass {
    pub const ALL: [VoltageClass; 3] = [VoltageClass::V12, VoltageClass::V24, VoltageClass::V48];

    pub fn volts(self) -> u16 {
        match self {
            VoltageClass::V12 => 12,
            VoltageClass::V24 => 24,
            VoltageClass::V48 => 48,
        }
    }

    pub fn nominal(self) -> f64 {
        f64::from(self.volts())
    }
}

impl TryFrom<u16> for VoltageClass {
    type Error = CoreError;

    fn try_from(volts: u16) -> CoreResult<Self> {
        match volts {
            12 => Ok(VoltageClass::V12),
            24 => Ok(VoltageClass::V24),
            48 => Ok(VoltageClass::V48),
            other => Err(CoreError::Domain(format!("{}V", other))),
        }
    }
}

impl From<VoltageClass> for u16 {
    fn from(class: VoltageClass) -> u16 {
        class.volts()
    }
}

impl FromStr for VoltageClass {
    type Err = CoreError;

    fn from_str(text: &str) -> CoreResult<Self> {
        let trimmed = text.trim().trim_end_matches(['V', 'v']);
        let volts = trimmed
            .parse::<u16>()
            .map_err(|_| CoreError::Domain(text.to_string()))?;
        VoltageClass::try_from(volts)
    }
}

impl fmt::Display for VoltageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.volts())
    }
}

/// Which source feeds the load first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePriority {
    UtilityFirst,
    SolarFirst,
    /// Solar, then battery, then utility.
    Sbu,
}

impl SourcePriority {
    /// Firmware command code.
    pub fn code(self) -> u8 {
        match self {
            SourcePriority::UtilityFirst => 0,
            SourcePriority::SolarFirst => 1,
            SourcePriority::Sbu => 2,
        }
    }

    pub fn from_code(code: u8) -> CoreResult<Self> {
        match code {
            0 => Ok(SourcePriority::UtilityFirst),
            1 => Ok(SourcePriority::SolarFirst),
            2 => Ok(SourcePriority::Sbu),
            other => Err(CoreError::Range(format!("source priority code {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryType {
    Agm,
    Flooded,
    UserDefined,
    Lithium,
}

impl BatteryType {
    /// Firmware command code. Not sequential: lithium is `8`.
    pub fn code(self) -> u8 {
        match self {
            BatteryType::Agm => 0,
            BatteryType::Flooded => 1,
            BatteryType::UserDefined => 2,
            BatteryType::Lithium => 8,
        }
    }

    pub fn from_code(code: u8) -> CoreResult<Self> {
        match code {
            0 => Ok(BatteryType::Agm),
            1 => Ok(BatteryType::Flooded),
            2 => Ok(BatteryType::UserDefined),
            8 => Ok(BatteryType::Lithium),
            other => Err(CoreError::Range(format!("battery type code {}", other))),
        }
    }

    /// Position in the dashboard's battery type selector.
    pub fn from_index(index: usize) -> CoreResult<Self> {
        match index {
            0 => Ok(BatteryType::Agm),
            1 => Ok(BatteryType::Flooded),
            2 => Ok(BatteryType::UserDefined),
            3 => Ok(BatteryType::Lithium),
            other => Err(CoreError::Range(format!("battery type index {}", other))),
        }
    }
}

/// Engineering values for one inverter's battery settings.
///
/// Presets and user overrides share this shape; the encoder turns either into
/// a [`CommandRecord`](crate::command::CommandRecord).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryProfile {
    pub source_priority: SourcePriority,
    pub battery_type: BatteryType,
    pub buzzer: bool,
    pub overload_bypass: bool,
    pub over_temp_restart: bool,
    pub backlight: bool,
    pub source_interrupt_alarm: bool,
    /// Amps.
    pub utility_max_current: u16,
    /// Amps.
    pub solar_max_current: u16,
    pub cutoff_voltage: f64,
    pub charging_voltage: f64,
    pub float_voltage: f64,
    pub low_voltage_alarm: f64,
    /// Volts AC.
    pub low_ac_alarm: u16,
    /// Percent of rated load.
    pub high_ac_load_alarm: u16,
    /// Amps.
    pub high_discharge_alarm: u16,
}

/// The bank an inverter is wired to, as registered by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySystem {
    pub voltage: VoltageClass,
    pub capacity_ah: u32,
    pub battery_type: BatteryType,
    pub commands_enabled: bool,
}
