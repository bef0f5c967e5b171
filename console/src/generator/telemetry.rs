use crate::gateway::TelemetryRow;
use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use solcore::flags::{format_wire, mask_of, CriticalAlarm, FlagSet, MaintenanceWarning};

/// Configuration for generating synthetic device telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub devices: usize,
    pub seed: u64,
    /// Probability that any one critical alarm bit is set.
    pub alarm_rate: f64,
    /// Probability that any one maintenance warning bit is set.
    pub warning_rate: f64,
    /// Upper bound (exclusive) of the resistance draw, in ohms.
    pub max_resistance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            devices: 3,
            seed: 0,
            alarm_rate: 0.1,
            warning_rate: 0.25,
            max_resistance: 16.0,
        }
    }
}

/// Dashboard-style ids: `inv001`, `inv002`, ...
pub fn device_id(index: usize) -> String {
    format!("inv{:03}", index + 1)
}

fn draw_flags<F: FlagSet>(rng: &mut StdRng, rate: f64) -> u8 {
    let set: Vec<F> = F::ALL
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(rate))
        .collect();
    mask_of(&set)
}

pub fn build_telemetry(config: &GeneratorConfig) -> anyhow::Result<Vec<(String, TelemetryRow)>> {
    ensure!(
        (0.0..=1.0).contains(&config.alarm_rate) && (0.0..=1.0).contains(&config.warning_rate),
        "flag rates must be probabilities, got {} and {}",
        config.alarm_rate,
        config.warning_rate
    );
    ensure!(
        config.max_resistance.is_finite() && config.max_resistance > 0.0,
        "max_resistance must be finite and positive, got {}",
        config.max_resistance
    );
    ensure!(config.devices <= 999, "at most 999 devices fit the id scheme");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let rows = (0..config.devices)
        .map(|index| {
            let critical = draw_flags::<CriticalAlarm>(&mut rng, config.alarm_rate);
            let maintenance = draw_flags::<MaintenanceWarning>(&mut rng, config.warning_rate);
            let resistance = rng.gen_range(0.0..config.max_resistance);
            let row = TelemetryRow {
                critical_alarms: format_wire(critical),
                maintenance_warnings: format_wire(maintenance),
                resistance: Some(resistance),
            };
            (device_id(index), row)
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solcore::flags::parse_wire;

    #[test]
    fn generator_builds_one_row_per_device() {
        let rows = build_telemetry(&GeneratorConfig::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, "inv001");
        for (_, row) in &rows {
            parse_wire(&row.critical_alarms).unwrap();
            assert!(parse_wire(&row.maintenance_warnings).unwrap() < 0x10);
            assert!(row.resistance.unwrap() < 16.0);
        }
    }

    #[test]
    fn same_seed_repeats_telemetry() {
        let config = GeneratorConfig {
            devices: 5,
            seed: 42,
            ..Default::default()
        };
        assert_eq!(
            build_telemetry(&config).unwrap(),
            build_telemetry(&config).unwrap()
        );
    }

    #[test]
    fn saturated_rates_set_every_bit() {
        let config = GeneratorConfig {
            devices: 1,
            alarm_rate: 1.0,
            warning_rate: 0.0,
            ..Default::default()
        };
        let rows = build_telemetry(&config).unwrap();
        assert_eq!(rows[0].1.critical_alarms, "\\xff");
        assert_eq!(rows[0].1.maintenance_warnings, "\\x00");
    }

    #[test]
    fn bad_rate_is_rejected() {
        let config = GeneratorConfig {
            alarm_rate: 1.5,
            ..Default::default()
        };
        assert!(build_telemetry(&config).is_err());
    }

    #[test]
    fn bad_resistance_is_rejected() {
        for max_resistance in [f64::INFINITY, 0.0, f64::NAN] {
            let config = GeneratorConfig {
                max_resistance,
                ..Default::default()
            };
            assert!(build_telemetry(&config).is_err(), "accepted {}", max_resistance);
        }

        let config: GeneratorConfig = serde_yaml::from_str("max_resistance: .inf\n").unwrap();
        assert!(build_telemetry(&config).is_err());
    }
}
