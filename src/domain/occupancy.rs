use super::lot::{LotId, VehicleClass};
use crate::error::ParkingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration number of a vehicle, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(value: impl Into<String>) -> Result<Self, ParkingError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(ParkingError::ValidationError(
                "Vehicle number must not be empty".to_string(),
            ))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VehicleId {
    type Error = ParkingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for VehicleId {
    type Error = ParkingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vehicle currently holding one capacity unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub vehicle: VehicleId,
    pub lot: LotId,
    pub class: VehicleClass,
    pub entry_time: DateTime<Utc>,
    pub display_name: Option<String>,
}

impl Occupancy {
    pub fn new(
        vehicle: VehicleId,
        lot: LotId,
        class: VehicleClass,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            vehicle,
            lot,
            class,
            entry_time,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Whether this occupancy holds a unit of the given cell.
    pub fn holds(&self, lot: LotId, class: VehicleClass) -> bool {
        self.lot == lot && self.class == class
    }
}
