use crate::gateway::model::{DeviceRow, TelemetryRow};
use log::debug;
use solcore::command::CommandRecord;
use solcore::profile::BatterySystem;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("device store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("device store is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("device store lock poisoned")]
    Poisoned,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

type Rows = BTreeMap<String, DeviceRow>;

/// Keyed device storage. Writes are upserts and the last write wins.
pub trait PersistenceGateway: Send + Sync {
    fn read(&self, device_id: &str) -> GatewayResult<Option<DeviceRow>>;

    /// Applies `edit` to the row for `device_id`, creating it if needed.
    fn upsert(&self, device_id: &str, edit: &mut dyn FnMut(&mut DeviceRow)) -> GatewayResult<()>;

    fn devices(&self) -> GatewayResult<Vec<String>>;

    fn write_command(&self, device_id: &str, record: &CommandRecord) -> GatewayResult<()> {
        self.upsert(device_id, &mut |row| row.command = Some(record.clone()))
    }

    fn write_telemetry(&self, device_id: &str, telemetry: &TelemetryRow) -> GatewayResult<()> {
        self.upsert(device_id, &mut |row| row.telemetry = Some(telemetry.clone()))
    }

    fn write_battery_system(&self, device_id: &str, system: &BatterySystem) -> GatewayResult<()> {
        self.upsert(device_id, &mut |row| row.battery_system = Some(*system))
    }
}

/// Process-local store, mostly for tests and dry runs.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryGateway {
    rows: RwLock<Rows>,
}

#[allow(dead_code)]
impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn read(&self, device_id: &str) -> GatewayResult<Option<DeviceRow>> {
        let rows = self.rows.read().map_err(|_| GatewayError::Poisoned)?;
        Ok(rows.get(device_id).cloned())
    }

    fn upsert(&self, device_id: &str, edit: &mut dyn FnMut(&mut DeviceRow)) -> GatewayResult<()> {
        let mut rows = self.rows.write().map_err(|_| GatewayError::Poisoned)?;
        edit(rows.entry(device_id.to_string()).or_default());
        Ok(())
    }

    fn devices(&self) -> GatewayResult<Vec<String>> {
        let rows = self.rows.read().map_err(|_| GatewayError::Poisoned)?;
        Ok(rows.keys().cloned().collect())
    }
}

/// Store kept as a single JSON document on disk.
pub struct FileGateway {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileGateway {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> GatewayResult<Rows> {
        if !self.path.exists() {
            return Ok(Rows::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Rows::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, rows: &Rows) -> GatewayResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(rows)?)?;
        debug!("saved {} device rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

impl PersistenceGateway for FileGateway {
    fn read(&self, device_id: &str) -> GatewayResult<Option<DeviceRow>> {
        let _guard = self.lock.lock().map_err(|_| GatewayError::Poisoned)?;
        Ok(self.load()?.remove(device_id))
    }

    fn upsert(&self, device_id: &str, edit: &mut dyn FnMut(&mut DeviceRow)) -> GatewayResult<()> {
        let _guard = self.lock.lock().map_err(|_| GatewayError::Poisoned)?;
        let mut rows = self.load()?;
        edit(rows.entry(device_id.to_string()).or_default());
        self.save(&rows)
    }

    fn devices(&self) -> GatewayResult<Vec<String>> {
        let _guard = self.lock.lock().map_err(|_| GatewayError::Poisoned)?;
        Ok(self.load()?.into_keys().collect())
    }
}
