use crate::domain::lot::{LotId, VehicleClass};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkingError {
    #[error("No spots available for {1} in {0}")]
    NoCapacity(LotId, VehicleClass),
    #[error("All spots are already free for {1} in {0}")]
    AtCapacity(LotId, VehicleClass),
    #[error("No capacity provisioned for {1} in {0}")]
    UnknownCell(LotId, VehicleClass),
    #[error("No tariff found for {1} in {0}")]
    UnknownTariff(LotId, VehicleClass),
    #[error("Capacity for {1} in {0} is already provisioned")]
    AlreadyProvisioned(LotId, VehicleClass),
    #[error("Unknown parking lot id: {0}")]
    UnknownLot(u8),
    #[error("Unknown vehicle class id: {0}")]
    UnknownVehicleClass(u8),
    #[error("Vehicle {0} is already in a parking space")]
    DuplicateKey(String),
    #[error("Vehicle {0} is not parked here")]
    NotOccupied(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ParkingError>;
