use crate::command::format::{EnumCode, FixedDecimal, PaddedInt};
use crate::command::validate::validate;
use crate::prelude::CoreResult;
use crate::profile::{BatteryProfile, BatterySystem, BatteryType, SourcePriority, VoltageClass};
use serde::{Deserialize, Serialize};

/// Wire-ready settings for one inverter.
///
/// Field names and renderings are the contract with the inverter firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    #[serde(rename = "inverter_id")]
    pub target_id: String,
    pub source_priority: EnumCode,
    #[serde(rename = "u_max_cc")]
    pub utility_max_current: PaddedInt,
    #[serde(rename = "s_max_cc")]
    pub solar_max_current: PaddedInt,
    #[serde(rename = "battery_cov")]
    pub cutoff_voltage: FixedDecimal,
    #[serde(rename = "battery_cv")]
    pub charging_voltage: FixedDecimal,
    #[serde(rename = "battery_fcv")]
    pub float_voltage: FixedDecimal,
    pub battery_type: EnumCode,
    #[serde(rename = "buzzer_st")]
    pub buzzer: bool,
    #[serde(rename = "ov_bypass_st")]
    pub overload_bypass: bool,
    #[serde(rename = "temp_rst_st")]
    pub over_temp_restart: bool,
    #[serde(rename = "bck_light_st")]
    pub backlight: bool,
    #[serde(rename = "psi_alarm_st")]
    pub source_interrupt_alarm: bool,
    /// Asks the inverter to restore its own factory settings.
    #[serde(rename = "defult_value")]
    pub restore_defaults: bool,
    #[serde(rename = "battery_lv_th")]
    pub low_voltage_alarm: FixedDecimal,
    #[serde(rename = "ac_lv_th")]
    pub low_ac_alarm: u16,
    #[serde(rename = "ac_ol_th")]
    pub high_ac_load_alarm: u16,
    #[serde(rename = "battery_dc_th")]
    pub high_discharge_alarm: u16,
    /// Tells the consumer to apply the record.
    #[serde(rename = "cf")]
    pub force_update: bool,
}

impl CommandRecord {
    fn from_profile(profile: &BatteryProfile, target_id: &str) -> Self {
        Self {
            target_id: target_id.to_string(),
            source_priority: EnumCode::new(profile.source_priority.code()),
            utility_max_current: PaddedInt::new(profile.utility_max_current),
            solar_max_current: PaddedInt::new(profile.solar_max_current),
            cutoff_voltage: FixedDecimal::new(profile.cutoff_voltage),
            charging_voltage: FixedDecimal::new(profile.charging_voltage),
            float_voltage: FixedDecimal::new(profile.float_voltage),
            battery_type: EnumCode::new(profile.battery_type.code()),
            buzzer: profile.buzzer,
            overload_bypass: profile.overload_bypass,
            over_temp_restart: profile.over_temp_restart,
            backlight: profile.backlight,
            source_interrupt_alarm: profile.source_interrupt_alarm,
            restore_defaults: false,
            low_voltage_alarm: FixedDecimal::new(profile.low_voltage_alarm),
            low_ac_alarm: profile.low_ac_alarm,
            high_ac_load_alarm: profile.high_ac_load_alarm,
            high_discharge_alarm: profile.high_discharge_alarm,
            force_update: true,
        }
    }

    pub fn with_restore_defaults(mut self, restore: bool) -> Self {
        self.restore_defaults = restore;
        self
    }

    /// Reads the engineering values back out of a stored record, e.g. to
    /// pre-fill a settings form.
    pub fn profile(&self) -> CoreResult<BatteryProfile> {
        Ok(BatteryProfile {
            source_priority: SourcePriority::from_code(self.source_priority.value())?,
            battery_type: BatteryType::from_code(self.battery_type.value())?,
            buzzer: self.buzzer,
            overload_bypass: self.overload_bypass,
            over_temp_restart: self.over_temp_restart,
            backlight: self.backlight,
            source_interrupt_alarm: self.source_interrupt_alarm,
            utility_max_current: self.utility_max_current.value(),
            solar_max_current: self.solar_max_current.value(),
            cutoff_voltage: self.cutoff_voltage.value()?,
            charging_voltage: self.charging_voltage.value()?,
            float_voltage: self.float_voltage.value()?,
            low_voltage_alarm: self.low_voltage_alarm.value()?,
            low_ac_alarm: self.low_ac_alarm,
            high_ac_load_alarm: self.high_ac_load_alarm,
            high_discharge_alarm: self.high_discharge_alarm,
        })
    }
}

/// Validates `profile` against the bounds of the selected `class` and renders it.
pub fn encode_command(
    profile: &BatteryProfile,
    class: VoltageClass,
    target_id: &str,
) -> CoreResult<CommandRecord> {
    validate(profile, class)?;
    Ok(CommandRecord::from_profile(profile, target_id))
}

/// Factory defaults for `class`, ready to send.
pub fn reset_to_default(class: VoltageClass, target_id: &str) -> CommandRecord {
    CommandRecord::from_profile(class.preset(), target_id)
}

/// Defaults for a newly registered battery bank, keeping the owner's battery type.
pub fn encode_battery_system(system: &BatterySystem, target_id: &str) -> CommandRecord {
    let profile = BatteryProfile {
        battery_type: system.battery_type,
        ..*system.voltage.preset()
    };
    CommandRecord::from_profile(&profile, target_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::CoreError;
    use crate::profile::lookup;
    use serde_json::json;

    #[test]
    fn fields_render_in_firmware_format() {
        let profile = BatteryProfile {
            source_priority: SourcePriority::SolarFirst,
            battery_type: BatteryType::Lithium,
            ..*VoltageClass::V12.preset()
        };
        let record = encode_command(&profile, VoltageClass::V12, "inv001").unwrap();
        assert_eq!(record.source_priority.to_string(), "01");
        assert_eq!(record.battery_type.to_string(), "08");
        assert_eq!(record.utility_max_current.to_string(), "030");
        assert_eq!(record.cutoff_voltage.as_str(), "10.5");
        assert!(record.force_update);
    }

    #[test]
    fn reset_matches_encoding_the_preset() {
        for class in VoltageClass::ALL {
            let preset = lookup(class.volts()).unwrap();
            assert_eq!(
                reset_to_default(class, "inv042"),
                encode_command(preset, class, "inv042").unwrap()
            );
        }
    }

    #[test]
    fn invalid_current_is_rejected_not_clamped() {
        let profile = BatteryProfile {
            utility_max_current: 15,
            ..*VoltageClass::V24.preset()
        };
        assert!(matches!(
            encode_command(&profile, VoltageClass::V24, "inv001"),
            Err(CoreError::Range(_))
        ));
    }

    #[test]
    fn record_serializes_to_flat_wire_map() {
        let record = reset_to_default(VoltageClass::V24, "inv007");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "inverter_id": "inv007",
                "source_priority": "00",
                "u_max_cc": "040",
                "s_max_cc": "030",
                "battery_cov": "21.0",
                "battery_cv": "28.8",
                "battery_fcv": "27.0",
                "battery_type": "01",
                "buzzer_st": false,
                "ov_bypass_st": false,
                "temp_rst_st": false,
                "bck_light_st": false,
                "psi_alarm_st": false,
                "defult_value": false,
                "battery_lv_th": "22.0",
                "ac_lv_th": 176,
                "ac_ol_th": 85,
                "battery_dc_th": 100,
                "cf": true
            })
        );
        let back: CommandRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn stored_record_yields_original_profile() {
        let profile = BatteryProfile {
            source_priority: SourcePriority::Sbu,
            backlight: true,
            charging_voltage: 56.4,
            ..*VoltageClass::V48.preset()
        };
        let record = encode_command(&profile, VoltageClass::V48, "inv003").unwrap();
        assert_eq!(record.profile().unwrap(), profile);
    }

    #[test]
    fn battery_system_keeps_owner_battery_type() {
        let system = BatterySystem {
            voltage: VoltageClass::V48,
            capacity_ah: 200,
            battery_type: BatteryType::Agm,
            commands_enabled: true,
        };
        let record = encode_battery_system(&system, "inv009");
        assert_eq!(record.battery_type.to_string(), "00");
        assert_eq!(record.charging_voltage.as_str(), "57.6");
        assert!(!record.restore_defaults);
        assert!(record.force_update);
    }
}
