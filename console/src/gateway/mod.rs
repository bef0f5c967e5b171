pub mod model;
pub mod store;

pub use model::{DeviceRow, TelemetryRow};
pub use store::{FileGateway, MemoryGateway, PersistenceGateway};
