use crate::error::ParkingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical parking facility.
///
/// Each lot keeps independent capacity per [`VehicleClass`]. Numeric ids are
/// only accepted at the boundary through `TryFrom<u8>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LotId {
    A,
    B,
}

impl LotId {
    pub const ALL: [LotId; 2] = [LotId::A, LotId::B];

    pub fn id(self) -> u8 {
        match self {
            LotId::A => 1,
            LotId::B => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LotId::A => "Parking Lot A",
            LotId::B => "Parking Lot B",
        }
    }
}

impl TryFrom<u8> for LotId {
    type Error = ParkingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LotId::A),
            2 => Ok(LotId::B),
            other => Err(ParkingError::UnknownLot(other)),
        }
    }
}

impl From<LotId> for u8 {
    fn from(lot: LotId) -> Self {
        lot.id()
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vehicle category used to partition capacity and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VehicleClass {
    /// Motorcycles and scooters.
    Motorcycle,
    /// Cars and SUVs.
    Car,
    /// Buses and trucks.
    Truck,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [
        VehicleClass::Motorcycle,
        VehicleClass::Car,
        VehicleClass::Truck,
    ];

    pub fn id(self) -> u8 {
        match self {
            VehicleClass::Motorcycle => 1,
            VehicleClass::Car => 2,
            VehicleClass::Truck => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VehicleClass::Motorcycle => "Motorcycles/Scooters",
            VehicleClass::Car => "Cars/SUVs",
            VehicleClass::Truck => "Buses/Trucks",
        }
    }
}

impl TryFrom<u8> for VehicleClass {
    type Error = ParkingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VehicleClass::Motorcycle),
            2 => Ok(VehicleClass::Car),
            3 => Ok(VehicleClass::Truck),
            other => Err(ParkingError::UnknownVehicleClass(other)),
        }
    }
}

impl From<VehicleClass> for u8 {
    fn from(class: VehicleClass) -> Self {
        class.id()
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capacity accounting for one `(lot, vehicle class)` pair.
///
/// `available` stays within `[0, max_capacity]`. Only the allocation manager
/// (through a `CapacityStore`) changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCell {
    pub lot: LotId,
    pub class: VehicleClass,
    pub max_capacity: u32,
    pub available: u32,
}

impl CapacityCell {
    /// A freshly provisioned cell starts fully free.
    pub fn new(lot: LotId, class: VehicleClass, max_capacity: u32) -> Self {
        Self {
            lot,
            class,
            max_capacity,
            available: max_capacity,
        }
    }

    pub fn key(&self) -> (LotId, VehicleClass) {
        (self.lot, self.class)
    }

    pub fn occupied(&self) -> u32 {
        self.max_capacity - self.available
    }

    /// Takes one unit if any is free.
    pub fn try_take(&mut self) -> bool {
        if self.available > 0 {
            self.available -= 1;
            true
        } else {
            false
        }
    }

    /// Gives one unit back unless the cell is already at its ceiling.
    pub fn try_give_back(&mut self) -> bool {
        if self.available < self.max_capacity {
            self.available += 1;
            true
        } else {
            false
        }
    }
}
