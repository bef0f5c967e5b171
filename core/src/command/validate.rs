use crate::command::format::FixedDecimal;
use crate::prelude::{CoreError, CoreResult};
use crate::profile::{BatteryProfile, VoltageClass};

/// Slack for float bounds such as `48 * 1.2 + 1`.
const VOLT_EPSILON: f64 = 1e-6;

/// Inclusive integer range walked in fixed steps. Only the field constants
/// below exist, so the step is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    min: u16,
    max: u16,
    step: u16,
}

impl StepRange {
    pub const UTILITY_CURRENT: StepRange = StepRange::new(10, 100, 10);
    pub const SOLAR_CURRENT: StepRange = StepRange::new(10, 120, 10);
    pub const LOW_AC_ALARM: StepRange = StepRange::new(160, 220, 10);
    pub const HIGH_AC_LOAD_ALARM: StepRange = StepRange::new(50, 90, 5);
    pub const HIGH_DISCHARGE_ALARM: StepRange = StepRange::new(20, 150, 10);

    const fn new(min: u16, max: u16, step: u16) -> Self {
        Self { min, max, step }
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn step(&self) -> u16 {
        self.step
    }

    /// True when `value` is in range and a whole number of steps away from
    /// either the range minimum or `anchor` (the factory default).
    pub fn admits(&self, value: u16, anchor: u16) -> bool {
        let on_grid = |origin: u16| (i32::from(value) - i32::from(origin)).rem_euclid(i32::from(self.step)) == 0;
        (self.min..=self.max).contains(&value) && (on_grid(self.min) || on_grid(anchor))
    }

    fn check(&self, field: &str, value: u16, anchor: u16) -> CoreResult<()> {
        if self.admits(value, anchor) {
            Ok(())
        } else {
            Err(CoreError::Range(format!(
                "{} {} is not in {}..={} step {}",
                field, value, self.min, self.max, self.step
            )))
        }
    }
}

/// Inclusive float interval in volts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltRange {
    pub min: f64,
    pub max: f64,
}

impl VoltRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn admits(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min - VOLT_EPSILON && value <= self.max + VOLT_EPSILON
    }

    fn check(&self, field: &str, value: f64) -> CoreResult<()> {
        if self.admits(value) {
            Ok(())
        } else {
            Err(CoreError::Range(format!(
                "{} {}V is not in {:.1}..={:.1}V",
                field, value, self.min, self.max
            )))
        }
    }
}

/// Cut-off bounds for `class`: one volt under its default cut-off up to one
/// volt over nominal.
pub fn cutoff_range(class: VoltageClass) -> VoltRange {
    VoltRange::new(class.preset().cutoff_voltage - 1.0, class.nominal() + 1.0)
}

/// Charging and float voltage bounds for `class`.
pub fn charge_range(class: VoltageClass) -> VoltRange {
    VoltRange::new(class.nominal() - 1.0, class.nominal() * 1.2 + 1.0)
}

/// Low-voltage alarm bounds, which follow the submitted cut-off and float values.
pub fn low_voltage_alarm_range(profile: &BatteryProfile) -> VoltRange {
    VoltRange::new(profile.cutoff_voltage - 1.0, profile.float_voltage + 1.0)
}

/// The voltage the inverter receives once `value` is rendered to one decimal.
fn as_sent(value: f64) -> CoreResult<f64> {
    FixedDecimal::new(value).value()
}

/// Checks every numeric field of `profile` against the bounds of `class`.
///
/// Voltages are checked as rendered on the wire, so `58.64` passes where
/// `58.6` does.
pub fn validate(profile: &BatteryProfile, class: VoltageClass) -> CoreResult<()> {
    let preset = class.preset();
    let sent = BatteryProfile {
        cutoff_voltage: as_sent(profile.cutoff_voltage)?,
        charging_voltage: as_sent(profile.charging_voltage)?,
        float_voltage: as_sent(profile.float_voltage)?,
        low_voltage_alarm: as_sent(profile.low_voltage_alarm)?,
        ..*profile
    };

    StepRange::UTILITY_CURRENT.check(
        "utility max current",
        profile.utility_max_current,
        preset.utility_max_current,
    )?;
    StepRange::SOLAR_CURRENT.check(
        "solar max current",
        profile.solar_max_current,
        preset.solar_max_current,
    )?;

    cutoff_range(class).check("cut-off voltage", sent.cutoff_voltage)?;
    charge_range(class).check("charging voltage", sent.charging_voltage)?;
    charge_range(class).check("float voltage", sent.float_voltage)?;
    low_voltage_alarm_range(&sent).check("low voltage alarm", sent.low_voltage_alarm)?;

    StepRange::LOW_AC_ALARM.check("low AC alarm", profile.low_ac_alarm, preset.low_ac_alarm)?;
    StepRange::HIGH_AC_LOAD_ALARM.check(
        "high AC load alarm",
        profile.high_ac_load_alarm,
        preset.high_ac_load_alarm,
    )?;
    StepRange::HIGH_DISCHARGE_ALARM.check(
        "high discharge current alarm",
        profile.high_discharge_alarm,
        preset.high_discharge_alarm,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with<F: FnOnce(&mut BatteryProfile)>(class: VoltageClass, edit: F) -> BatteryProfile {
        let mut profile = *class.preset();
        edit(&mut profile);
        profile
    }

    #[test]
    fn presets_pass_their_own_bounds() {
        for class in VoltageClass::ALL {
            validate(class.preset(), class).unwrap();
        }
    }

    #[test]
    fn off_step_and_over_max_currents_fail() {
        for amps in [15, 105, 0, 110] {
            let profile = with(VoltageClass::V24, |p| p.utility_max_current = amps);
            assert!(matches!(
                validate(&profile, VoltageClass::V24),
                Err(CoreError::Range(_))
            ));
        }
        let profile = with(VoltageClass::V24, |p| p.solar_max_current = 120);
        validate(&profile, VoltageClass::V24).unwrap();
    }

    #[test]
    fn low_ac_alarm_accepts_both_grids() {
        let range = StepRange::LOW_AC_ALARM;
        assert!(range.admits(160, 176));
        assert!(range.admits(176, 176));
        assert!(range.admits(216, 176));
        assert!(!range.admits(175, 176));
        assert!(!range.admits(226, 176));
    }

    #[test]
    fn voltage_bounds_track_class() {
        let high = with(VoltageClass::V48, |p| p.charging_voltage = 58.6);
        validate(&high, VoltageClass::V48).unwrap();

        let too_high = with(VoltageClass::V48, |p| p.charging_voltage = 58.7);
        assert!(validate(&too_high, VoltageClass::V48).is_err());

        let cutoff = with(VoltageClass::V12, |p| p.cutoff_voltage = 9.4);
        assert!(validate(&cutoff, VoltageClass::V12).is_err());
        let cutoff = with(VoltageClass::V12, |p| p.cutoff_voltage = 9.5);
        validate(&cutoff, VoltageClass::V12).unwrap();
    }

    #[test]
    fn voltages_are_bounded_as_rendered() {
        let rounds_in = with(VoltageClass::V48, |p| p.charging_voltage = 58.64);
        validate(&rounds_in, VoltageClass::V48).unwrap();

        let rounds_out = with(VoltageClass::V48, |p| p.charging_voltage = 58.66);
        assert!(validate(&rounds_out, VoltageClass::V48).is_err());

        let alarm = with(VoltageClass::V12, |p| p.low_voltage_alarm = 14.54);
        validate(&alarm, VoltageClass::V12).unwrap();
    }

    #[test]
    fn field_grids_step_forward() {
        for range in [
            StepRange::UTILITY_CURRENT,
            StepRange::SOLAR_CURRENT,
            StepRange::LOW_AC_ALARM,
            StepRange::HIGH_AC_LOAD_ALARM,
            StepRange::HIGH_DISCHARGE_ALARM,
        ] {
            assert!(range.step() > 0);
            assert!(range.min() < range.max());
            assert!(range.admits(range.min(), range.min()));
            assert!(range.admits(range.max(), range.min()));
        }
    }

    #[test]
    fn switching_class_reapplies_bounds() {
        // 12V values submitted while 24V is selected.
        assert!(validate(VoltageClass::V12.preset(), VoltageClass::V24).is_err());
    }

    #[test]
    fn low_voltage_alarm_follows_submitted_values() {
        let profile = with(VoltageClass::V12, |p| {
            p.cutoff_voltage = 12.0;
            p.low_voltage_alarm = 10.9;
        });
        assert!(validate(&profile, VoltageClass::V12).is_err());

        let profile = with(VoltageClass::V12, |p| p.low_voltage_alarm = 14.5);
        validate(&profile, VoltageClass::V12).unwrap();
    }

    #[test]
    fn non_finite_voltage_is_rejected() {
        let profile = with(VoltageClass::V24, |p| p.float_voltage = f64::NAN);
        assert!(matches!(
            validate(&profile, VoltageClass::V24),
            Err(CoreError::Range(_))
        ));
    }
}
