use crate::gateway::{DeviceRow, PersistenceGateway, TelemetryRow};
use crate::generator::telemetry::{build_telemetry, GeneratorConfig};
use crate::workflow::config::{check_device_id, SettingsFile};
use anyhow::{bail, Context};
use log::{info, warn};
use serde::Serialize;
use solcore::command::{encode_battery_system, encode_command, reset_to_default, CommandRecord};
use solcore::flags::{
    count_set, format_wire, parse_wire, triggered, CriticalAlarm, MaintenanceWarning, CLEAR,
};
use solcore::profile::{BatteryProfile, BatterySystem, VoltageClass};
use solcore::soh::{SohCategory, SugenoSystem};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct SohReport {
    pub resistance: f64,
    pub score: f64,
    pub category: SohCategory,
    pub memberships: [f64; SohCategory::COUNT],
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub device: String,
    pub alarm_count: u32,
    pub warning_count: u32,
    pub critical: Vec<CriticalAlarm>,
    pub maintenance: Vec<MaintenanceWarning>,
    /// Absent when there is no reading or no rule fired.
    pub soh: Option<SohReport>,
}

#[derive(Clone)]
pub struct Runner {
    gateway: Arc<dyn PersistenceGateway>,
    engine: SugenoSystem,
}

impl Runner {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            engine: SugenoSystem::battery_soh(),
        }
    }

    fn row(&self, device: &str) -> anyhow::Result<DeviceRow> {
        self.gateway
            .read(device)
            .with_context(|| format!("reading device {}", device))?
            .with_context(|| format!("unknown device {}", device))
    }

    pub fn status(&self, device: &str) -> anyhow::Result<DeviceReport> {
        let telemetry = self
            .row(device)?
            .telemetry
            .with_context(|| format!("no telemetry reported by {}", device))?;

        let critical = parse_wire(&telemetry.critical_alarms)
            .with_context(|| format!("decoding critical alarms of {}", device))?;
        let maintenance = parse_wire(&telemetry.maintenance_warnings)
            .with_context(|| format!("decoding maintenance warnings of {}", device))?;

        Ok(DeviceReport {
            device: device.to_string(),
            alarm_count: count_set(critical),
            warning_count: count_set(maintenance),
            critical: triggered(critical),
            maintenance: triggered(maintenance),
            soh: self.soh(device, telemetry.resistance),
        })
    }

    fn soh(&self, device: &str, resistance: Option<f64>) -> Option<SohReport> {
        // Zero means the device has not measured yet.
        let resistance = resistance.filter(|r| *r != 0.0)?;
        match self.engine.infer(resistance) {
            Ok(estimate) => Some(SohReport {
                resistance,
                score: estimate.score,
                category: estimate.dominant(),
                memberships: estimate.memberships,
            }),
            Err(err) => {
                warn!("no health estimate for {} at {} ohm: {}", device, resistance, err);
                None
            }
        }
    }

    fn enabled_system(&self, row: &DeviceRow, device: &str) -> anyhow::Result<BatterySystem> {
        match row.battery_system {
            Some(system) if system.commands_enabled => Ok(system),
            Some(_) => bail!("commands are disabled for {}", device),
            None => bail!("no battery system registered for {}", device),
        }
    }

    /// Encodes a settings submission and stores it for the device.
    pub fn submit(&self, settings: &SettingsFile) -> anyhow::Result<CommandRecord> {
        let device = settings.device.as_str();
        check_device_id(device)?;
        let row = self.gateway.read(device)?.unwrap_or_default();
        let system = self.enabled_system(&row, device)?;
        let class = settings.voltage.unwrap_or(system.voltage);

        let base = match row.command.as_ref().map(CommandRecord::profile) {
            Some(Ok(profile)) => profile,
            Some(Err(err)) => {
                warn!("stored command for {} unreadable ({}), starting from preset", device, err);
                *class.preset()
            }
            None => *class.preset(),
        };
        let profile = settings.overrides.apply(&BatteryProfile {
            battery_type: system.battery_type,
            ..base
        });

        let record = encode_command(&profile, class, device)
            .with_context(|| format!("encoding settings for {}", device))?
            .with_restore_defaults(settings.factory_reset);
        self.gateway
            .write_command(device, &record)
            .with_context(|| format!("storing command for {}", device))?;
        info!("stored {} settings for {}", class, device);
        Ok(record)
    }

    /// Stores the factory defaults of the device's voltage class.
    pub fn reset(&self, device: &str, voltage: Option<VoltageClass>) -> anyhow::Result<CommandRecord> {
        check_device_id(device)?;
        let row = self.gateway.read(device)?.unwrap_or_default();
        let system = self.enabled_system(&row, device)?;
        let class = voltage.unwrap_or(system.voltage);

        let record = reset_to_default(class, device);
        self.gateway
            .write_command(device, &record)
            .with_context(|| format!("storing defaults for {}", device))?;
        info!("reset {} to {} defaults", device, class);
        Ok(record)
    }

    /// Registers a battery bank and pushes the matching defaults.
    pub fn apply_battery_system(
        &self,
        device: &str,
        system: &BatterySystem,
    ) -> anyhow::Result<CommandRecord> {
        check_device_id(device)?;
        let record = encode_battery_system(system, device);
        self.gateway
            .write_battery_system(device, system)
            .with_context(|| format!("storing battery system for {}", device))?;
        self.gateway
            .write_command(device, &record)
            .with_context(|| format!("storing command for {}", device))?;
        info!(
            "registered {} {}Ah bank for {}",
            system.voltage, system.capacity_ah, device
        );
        Ok(record)
    }

    /// Clears every maintenance warning of the device.
    pub fn acknowledge_maintenance(&self, device: &str) -> anyhow::Result<()> {
        let mut telemetry = self.row(device)?.telemetry.unwrap_or_default();
        telemetry.maintenance_warnings = format_wire(CLEAR);
        self.gateway
            .write_telemetry(device, &telemetry)
            .with_context(|| format!("clearing warnings for {}", device))?;
        info!("maintenance warnings acknowledged for {}", device);
        Ok(())
    }

    /// Seeds the store with synthetic telemetry; returns the device ids written.
    pub fn simulate(&self, config: &GeneratorConfig) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String, TelemetryRow)> = build_telemetry(config)?;
        let mut written = Vec::with_capacity(rows.len());
        for (device, telemetry) in rows {
            self.gateway
                .write_telemetry(&device, &telemetry)
                .with_context(|| format!("storing telemetry for {}", device))?;
            written.push(device);
        }
        info!("simulated telemetry for {} devices", written.len());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::workflow::config::ProfileOverrides;
    use solcore::profile::BatteryType;

    fn runner_with_system(commands_enabled: bool) -> (Runner, Arc<MemoryGateway>) {
        let gateway = Arc::new(MemoryGateway::new());
        let runner = Runner::new(gateway.clone());
        let system = BatterySystem {
            voltage: VoltageClass::V24,
            capacity_ah: 150,
            battery_type: BatteryType::Lithium,
            commands_enabled,
        };
        runner.apply_battery_system("inv001", &system).unwrap();
        (runner, gateway)
    }

    fn settings(overrides: ProfileOverrides) -> SettingsFile {
        SettingsFile {
            device: "inv001".into(),
            voltage: None,
            factory_reset: false,
            overrides,
        }
    }

    #[test]
    fn status_decodes_alarms_and_health() {
        let (runner, gateway) = runner_with_system(true);
        let telemetry = TelemetryRow {
            critical_alarms: "\\x12".into(),
            maintenance_warnings: "\\x05".into(),
            resistance: Some(0.5),
        };
        gateway.write_telemetry("inv001", &telemetry).unwrap();

        let report = runner.status("inv001").unwrap();
        assert_eq!(report.alarm_count, 2);
        assert_eq!(
            report.critical,
            vec![
                CriticalAlarm::LowAcOutputVoltage,
                CriticalAlarm::HighInverterTemperature
            ]
        );
        assert_eq!(
            report.maintenance,
            vec![
                MaintenanceWarning::FullDischargeCycle,
                MaintenanceWarning::BatteryCheck
            ]
        );
        let soh = report.soh.unwrap();
        assert_eq!(soh.category, SohCategory::Healthy);
        assert!((soh.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_resistance_suppresses_health() {
        let (runner, gateway) = runner_with_system(true);
        let telemetry = TelemetryRow {
            resistance: Some(0.0),
            ..Default::default()
        };
        gateway.write_telemetry("inv001", &telemetry).unwrap();
        assert!(runner.status("inv001").unwrap().soh.is_none());
    }

    #[test]
    fn malformed_bitmask_fails_status() {
        let (runner, gateway) = runner_with_system(true);
        let telemetry = TelemetryRow {
            critical_alarms: "0x12".into(),
            ..Default::default()
        };
        gateway.write_telemetry("inv001", &telemetry).unwrap();
        assert!(runner.status("inv001").is_err());
    }

    #[test]
    fn submit_merges_overrides_onto_stored_record() {
        let (runner, gateway) = runner_with_system(true);
        let record = runner
            .submit(&settings(ProfileOverrides {
                solar_max_current: Some(60),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(record.solar_max_current.to_string(), "060");
        assert_eq!(record.battery_type.to_string(), "08");
        assert_eq!(record.utility_max_current.to_string(), "040");

        let record = runner
            .submit(&settings(ProfileOverrides {
                backlight: Some(true),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(record.solar_max_current.to_string(), "060");
        assert!(record.backlight);
        assert_eq!(gateway.read("inv001").unwrap().unwrap().command, Some(record));
    }

    #[test]
    fn submit_rejects_out_of_range_values() {
        let (runner, gateway) = runner_with_system(true);
        let before = gateway.read("inv001").unwrap().unwrap().command;
        let result = runner.submit(&settings(ProfileOverrides {
            utility_max_current: Some(105),
            ..Default::default()
        }));
        assert!(result.is_err());
        assert_eq!(gateway.read("inv001").unwrap().unwrap().command, before);
    }

    #[test]
    fn disabled_commands_block_submit_and_reset() {
        let (runner, _) = runner_with_system(false);
        assert!(runner.submit(&settings(ProfileOverrides::default())).is_err());
        assert!(runner.reset("inv001", None).is_err());
    }

    #[test]
    fn reset_writes_class_defaults() {
        let (runner, _) = runner_with_system(true);
        let record = runner.reset("inv001", Some(VoltageClass::V48)).unwrap();
        assert_eq!(record, reset_to_default(VoltageClass::V48, "inv001"));
    }

    #[test]
    fn acknowledge_clears_only_maintenance() {
        let (runner, gateway) = runner_with_system(true);
        let telemetry = TelemetryRow {
            critical_alarms: "\\x01".into(),
            maintenance_warnings: "\\x0f".into(),
            resistance: None,
        };
        gateway.write_telemetry("inv001", &telemetry).unwrap();
        runner.acknowledge_maintenance("inv001").unwrap();

        let report = runner.status("inv001").unwrap();
        assert_eq!(report.warning_count, 0);
        assert_eq!(report.alarm_count, 1);
    }

    #[test]
    fn simulate_then_status_for_every_device() {
        let runner = Runner::new(Arc::new(MemoryGateway::new()));
        let devices = runner
            .simulate(&GeneratorConfig {
                devices: 4,
                seed: 7,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(devices.len(), 4);
        for device in devices {
            runner.status(&device).unwrap();
        }
    }
}
