use crate::application::service::{ParkRequest, UnparkRequest};
use crate::domain::lot::{LotId, VehicleClass};
use crate::domain::occupancy::VehicleId;
use crate::error::{ParkingError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Park,
    Unpark,
}

/// One row of the event log: `type, lot, class, vehicle, time[, name]`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ParkingEvent {
    pub r#type: EventType,
    pub lot: LotId,
    pub class: VehicleClass,
    pub vehicle: VehicleId,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ParkingEvent {
    pub fn park_request(&self) -> ParkRequest {
        ParkRequest {
            lot: self.lot,
            class: self.class,
            vehicle: self.vehicle.clone(),
            display_name: self.name.clone(),
        }
    }

    pub fn unpark_request(&self) -> UnparkRequest {
        UnparkRequest {
            lot: self.lot,
            class: self.class,
            vehicle: self.vehicle.clone(),
        }
    }
}

/// Reads parking events from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<ParkingEvent>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events, so large
    /// logs are processed in a streaming fashion.
    pub fn events(self) -> impl Iterator<Item = Result<ParkingEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ParkingError::from))
    }
}
