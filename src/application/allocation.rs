use crate::domain::lot::{CapacityCell, LotId, VehicleClass};
use crate::domain::ports::CapacityStoreBox;
use crate::error::{ParkingError, Result};

/// Proof that one capacity unit of a cell was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub lot: LotId,
    pub class: VehicleClass,
}

/// Guarantees that the vehicles of a class inside a lot never exceed the
/// provisioned ceiling, under concurrent admits and releases.
///
/// Every mutation is delegated to a single conditional update of the
/// `CapacityStore`; the manager never reads a count and writes it back.
pub struct AllocationManager {
    store: CapacityStoreBox,
}

impl AllocationManager {
    pub fn new(store: CapacityStoreBox) -> Self {
        Self { store }
    }

    /// Creates a cell with `max_capacity` free units.
    ///
    /// Fails with `AlreadyProvisioned` if the cell exists; its availability is
    /// left untouched.
    pub async fn provision(
        &self,
        lot: LotId,
        class: VehicleClass,
        max_capacity: u32,
    ) -> Result<()> {
        self.store.provision(lot, class, max_capacity).await
    }

    /// Takes one unit, or fails with `NoCapacity` leaving the cell unchanged.
    pub async fn admit(&self, lot: LotId, class: VehicleClass) -> Result<Reservation> {
        if self.store.conditional_decrement(lot, class).await? {
            Ok(Reservation { lot, class })
        } else {
            Err(ParkingError::NoCapacity(lot, class))
        }
    }

    /// Returns one unit. `AtCapacity` means the caller released without a
    /// matching admit.
    pub async fn release(&self, lot: LotId, class: VehicleClass) -> Result<()> {
        if self.store.conditional_increment(lot, class).await? {
            Ok(())
        } else {
            Err(ParkingError::AtCapacity(lot, class))
        }
    }

    /// Free units right now. May be stale as soon as it returns.
    pub async fn current_availability(&self, lot: LotId, class: VehicleClass) -> Result<u32> {
        self.store.read_availability(lot, class).await
    }

    pub async fn snapshot(&self) -> Result<Vec<CapacityCell>> {
        self.store.cells().await
    }
}
