use crate::flags::codec::{AlarmFlag, CLEAR};
use serde::{Deserialize, Serialize};

/// A fixed catalog of flags sharing one status byte.
///
/// `ALL` lists the flags in bit order starting at bit 0; a flag's bit is its
/// discriminant, so appending a flag never moves an existing one.
pub trait FlagSet: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn bit(self) -> u8;
    fn label(self) -> &'static str;
    fn message(self) -> &'static str;
}

/// Critical alarms reported by the inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CriticalAlarm {
    BatteryLowVoltage = 0,
    LowAcOutputVoltage = 1,
    HighAcOutputLoad = 2,
    HighBatteryDischargeCurrent = 3,
    HighInverterTemperature = 4,
    DeviceWarningStatus = 5,
    HighAcOutputFrequency = 6,
    LowAcOutputFrequency = 7,
}

impl FlagSet for CriticalAlarm {
    const ALL: &'static [Self] = &[
        Self::BatteryLowVoltage,
        Self::LowAcOutputVoltage,
        Self::HighAcOutputLoad,
        Self::HighBatteryDischargeCurrent,
        Self::HighInverterTemperature,
        Self::DeviceWarningStatus,
        Self::HighAcOutputFrequency,
        Self::LowAcOutputFrequency,
    ];

    fn bit(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            Self::BatteryLowVoltage => "Battery Low Voltage",
            Self::LowAcOutputVoltage => "Low AC Output Voltage",
            Self::HighAcOutputLoad => "High AC Output Load Power Percentage",
            Self::HighBatteryDischargeCurrent => "High Battery Discharging Current",
            Self::HighInverterTemperature => "High Inverter Temperature",
            Self::DeviceWarningStatus => "Device Warning Status",
            Self::HighAcOutputFrequency => "High AC Output Frequency",
            Self::LowAcOutputFrequency => "Low AC Output Frequency",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::BatteryLowVoltage => {
                "Battery voltage is critically low. Act now to prevent damage."
            }
            Self::LowAcOutputVoltage => {
                "AC output voltage is below the acceptable level; connected loads may misbehave."
            }
            Self::HighAcOutputLoad => "AC output load power has exceeded safe limits.",
            Self::HighBatteryDischargeCurrent => {
                "Battery is discharging at a high rate. Check the load conditions."
            }
            Self::HighInverterTemperature => {
                "Inverter temperature is above safe levels. Check ventilation."
            }
            Self::DeviceWarningStatus => {
                "Inverter fault detected. Consult the manual for troubleshooting."
            }
            Self::HighAcOutputFrequency => "AC output frequency is above normal.",
            Self::LowAcOutputFrequency => {
                "AC output frequency is below normal. Check inverter settings."
            }
        }
    }
}

/// Maintenance reminders; only the low four bits are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MaintenanceWarning {
    FullDischargeCycle = 0,
    PvCleaningTime = 1,
    BatteryCheck = 2,
    TotalStatisticsDisplay = 3,
}

impl FlagSet for MaintenanceWarning {
    const ALL: &'static [Self] = &[
        Self::FullDischargeCycle,
        Self::PvCleaningTime,
        Self::BatteryCheck,
        Self::TotalStatisticsDisplay,
    ];

    fn bit(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            Self::FullDischargeCycle => "Full Discharge Cycle",
            Self::PvCleaningTime => "PV Cleaning Time",
            Self::BatteryCheck => "Battery Check",
            Self::TotalStatisticsDisplay => "Total Statistics Display",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::FullDischargeCycle => {
                "A full discharge cycle was counted. Monitor battery health and recharge."
            }
            Self::PvCleaningTime => "Solar panels are due for cleaning.",
            Self::BatteryCheck => "Inspect the battery condition and connections.",
            Self::TotalStatisticsDisplay => "Total statistics are ready for review.",
        }
    }
}

/// Flags of `F` whose bit is set in `byte`, in bit order.
pub fn triggered<F: FlagSet>(byte: u8) -> Vec<F> {
    F::ALL
        .iter()
        .copied()
        .filter(|flag| (byte >> flag.bit()) & 1 == 1)
        .collect()
}

pub fn mask_of<F: FlagSet>(flags: &[F]) -> u8 {
    flags.iter().fold(CLEAR, |byte, flag| byte | (1 << flag.bit()))
}

/// Labels of `F` in bit order, suitable for the generic codec.
pub fn names<F: FlagSet>() -> Vec<&'static str> {
    F::ALL.iter().map(|flag| flag.label()).collect()
}

/// Every flag of `F` with its state in `byte`.
pub fn describe<F: FlagSet>(byte: u8) -> Vec<AlarmFlag> {
    F::ALL
        .iter()
        .map(|flag| AlarmFlag::new(flag.label(), flag.bit(), (byte >> flag.bit()) & 1 == 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::codec::{decode, encode, MAX_FLAGS};

    fn bits_are_dense<F: FlagSet>() {
        assert!(F::ALL.len() <= MAX_FLAGS);
        for (index, flag) in F::ALL.iter().enumerate() {
            assert_eq!(flag.bit() as usize, index);
        }
    }

    #[test]
    fn catalogs_declare_contiguous_bits() {
        bits_are_dense::<CriticalAlarm>();
        bits_are_dense::<MaintenanceWarning>();
    }

    #[test]
    fn typed_and_generic_decoding_agree() {
        for byte in 0..=u8::MAX {
            let generic = decode(byte, &names::<CriticalAlarm>()).unwrap();
            assert_eq!(generic, describe::<CriticalAlarm>(byte));
        }
    }

    #[test]
    fn triggered_alarms_follow_bits() {
        assert_eq!(
            triggered::<CriticalAlarm>(0x81),
            vec![
                CriticalAlarm::BatteryLowVoltage,
                CriticalAlarm::LowAcOutputFrequency
            ]
        );
        assert!(triggered::<MaintenanceWarning>(CLEAR).is_empty());
    }

    #[test]
    fn high_nibble_is_ignored_for_maintenance() {
        assert_eq!(
            triggered::<MaintenanceWarning>(0xF4),
            vec![MaintenanceWarning::BatteryCheck]
        );
        assert_eq!(describe::<MaintenanceWarning>(0xF4).len(), 4);
    }

    #[test]
    fn mask_matches_generic_encode() {
        let set = [
            MaintenanceWarning::PvCleaningTime,
            MaintenanceWarning::TotalStatisticsDisplay,
        ];
        let byte = mask_of(&set);
        assert_eq!(byte, 0x0A);
        assert_eq!(encode(&describe::<MaintenanceWarning>(byte)).unwrap(), byte);
    }
}
