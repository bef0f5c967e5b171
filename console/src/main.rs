use anyhow::Context;
use clap::{Parser, Subcommand};
use gateway::{FileGateway, PersistenceGateway};
use generator::telemetry::GeneratorConfig;
use log::{info, warn};
use serde::Serialize;
use solcore::flags::{parse_wire, triggered, CriticalAlarm, FlagSet, MaintenanceWarning};
use solcore::profile::{BatterySystem, BatteryType, VoltageClass};
use solcore::soh::SugenoSystem;
use solcore::CoreError;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use workflow::config::SettingsFile;
use workflow::runner::{DeviceReport, Runner};

mod gateway;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline console for Solsync inverter settings and telemetry")]
struct Args {
    /// JSON document holding device rows
    #[arg(long, default_value = "tools/data/devices.json")]
    store: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List devices in the store
    List,
    /// Show alarms, warnings and battery health for a device
    Status { device: String },
    /// Encode and store a settings file
    Submit {
        #[arg(long)]
        settings: PathBuf,
    },
    /// Store factory defaults for a device
    Reset {
        device: String,
        /// Voltage class; defaults to the registered battery system
        #[arg(long)]
        voltage: Option<VoltageClass>,
    },
    /// Register a battery bank and push its defaults
    Battery {
        device: String,
        #[arg(long)]
        voltage: VoltageClass,
        #[arg(long, default_value_t = 100)]
        capacity: u32,
        #[arg(long, default_value = "flooded", value_parser = parse_battery_type)]
        battery_type: BatteryType,
        #[arg(long, default_value_t = false)]
        enable_commands: bool,
    },
    /// Acknowledge and clear maintenance warnings
    Ack { device: String },
    /// Fill the store with synthetic telemetry
    Simulate {
        #[arg(long, default_value_t = 3)]
        devices: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Generator settings in YAML; overrides --devices and --seed
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode raw \xHH bitmask text without touching the store
    Decode {
        #[arg(long)]
        critical: Option<String>,
        #[arg(long)]
        maintenance: Option<String>,
    },
    /// Estimate battery health from a resistance reading in ohms
    Soh {
        #[arg(allow_negative_numbers = true)]
        resistance: f64,
    },
}

fn parse_battery_type(text: &str) -> Result<BatteryType, String> {
    match text.to_ascii_lowercase().as_str() {
        "agm" => Ok(BatteryType::Agm),
        "flooded" => Ok(BatteryType::Flooded),
        "user-defined" | "user_defined" => Ok(BatteryType::UserDefined),
        "lithium" => Ok(BatteryType::Lithium),
        other => Err(format!(
            "unknown battery type {:?} (agm, flooded, user-defined, lithium)",
            other
        )),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_flags<F: FlagSet>(title: &str, text: &str) -> anyhow::Result<()> {
    let byte = parse_wire(text).with_context(|| format!("decoding {}", title))?;
    println!("{} ({}):", title, text);
    for flag in triggered::<F>(byte) {
        println!("  [{}] {}: {}", flag.bit(), flag.label(), flag.message());
    }
    Ok(())
}

fn print_report(report: &DeviceReport) {
    println!(
        "{} -> {} alarm(s), {} warning(s)",
        report.device, report.alarm_count, report.warning_count
    );
    for alarm in &report.critical {
        println!("  ALARM   {}: {}", alarm.label(), alarm.message());
    }
    for warning in &report.maintenance {
        println!("  WARNING {}: {}", warning.label(), warning.message());
    }
    match &report.soh {
        Some(soh) => println!(
            "  SOH {:.1}% ({}) at {:.2} ohm",
            soh.score * 100.0,
            soh.category,
            soh.resistance
        ),
        None => println!("  SOH unavailable"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let gateway = Arc::new(FileGateway::new(&args.store));
    info!("device store {}", gateway.path().display());
    let runner = Runner::new(gateway.clone());

    match args.command {
        Command::List => {
            for device in gateway.devices().context("listing devices")? {
                println!("{}", device);
            }
        }
        Command::Status { device } => print_report(&runner.status(&device)?),
        Command::Submit { settings } => {
            let settings = SettingsFile::load(settings)?;
            print_json(&runner.submit(&settings)?)?;
        }
        Command::Reset { device, voltage } => print_json(&runner.reset(&device, voltage)?)?,
        Command::Battery {
            device,
            voltage,
            capacity,
            battery_type,
            enable_commands,
        } => {
            let system = BatterySystem {
                voltage,
                capacity_ah: capacity,
                battery_type,
                commands_enabled: enable_commands,
            };
            print_json(&runner.apply_battery_system(&device, &system)?)?;
        }
        Command::Ack { device } => {
            runner.acknowledge_maintenance(&device)?;
            println!("{}: maintenance warnings cleared", device);
        }
        Command::Simulate {
            devices,
            seed,
            config,
        } => {
            let config: GeneratorConfig = match config {
                Some(path) => {
                    let contents = fs::read_to_string(&path)
                        .with_context(|| format!("reading generator config {}", path.display()))?;
                    serde_yaml::from_str(&contents)
                        .with_context(|| format!("parsing generator config {}", path.display()))?
                }
                None => GeneratorConfig {
                    devices,
                    seed,
                    ..Default::default()
                },
            };
            for device in runner.simulate(&config)? {
                print_report(&runner.status(&device)?);
            }
        }
        Command::Decode {
            critical,
            maintenance,
        } => {
            if let Some(text) = critical {
                print_flags::<CriticalAlarm>("Critical alarms", &text)?;
            }
            if let Some(text) = maintenance {
                print_flags::<MaintenanceWarning>("Maintenance warnings", &text)?;
            }
        }
        Command::Soh { resistance } => match SugenoSystem::battery_soh().infer(resistance) {
            Ok(estimate) => print_json(&estimate)?,
            Err(CoreError::InferenceUndefined) => {
                warn!("no rule fired for {} ohm", resistance);
                println!("SOH unavailable");
            }
            Err(err) => return Err(err.into()),
        },
    }

    Ok(())
}
