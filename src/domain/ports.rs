use super::lot::{CapacityCell, LotId, VehicleClass};
use super::occupancy::{Occupancy, VehicleId};
use crate::error::Result;
use async_trait::async_trait;

/// Storage boundary for capacity cells.
///
/// Implementations must perform each conditional update as one atomic step:
/// two concurrent decrements against `available = 1` may not both succeed.
#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// Creates the cell fully free. Fails with `AlreadyProvisioned` if it exists.
    async fn provision(&self, lot: LotId, class: VehicleClass, max_capacity: u32) -> Result<()>;

    /// Fails with `UnknownCell` if the cell was never provisioned.
    async fn read_availability(&self, lot: LotId, class: VehicleClass) -> Result<u32>;

    /// Decrements `available` iff it is above zero. Returns whether it did.
    async fn conditional_decrement(&self, lot: LotId, class: VehicleClass) -> Result<bool>;

    /// Increments `available` iff it is below the cell's `max_capacity`.
    async fn conditional_increment(&self, lot: LotId, class: VehicleClass) -> Result<bool>;

    async fn cells(&self) -> Result<Vec<CapacityCell>>;
}

/// Storage boundary for active occupancies, keyed by vehicle.
#[async_trait]
pub trait OccupancyStore: Send + Sync {
    /// Inserts if absent, otherwise fails with `DuplicateKey`.
    async fn save(&self, occupancy: Occupancy) -> Result<()>;

    async fn load(&self, vehicle: &VehicleId) -> Result<Option<Occupancy>>;

    /// Removes and returns the occupancy; `NotOccupied` if there was none.
    async fn delete(&self, vehicle: &VehicleId) -> Result<Occupancy>;

    async fn all(&self) -> Result<Vec<Occupancy>>;
}

pub type CapacityStoreBox = Box<dyn CapacityStore>;
pub type OccupancyStoreBox = Box<dyn OccupancyStore>;

pub type CapacityStoreFactory = Box<dyn Fn() -> CapacityStoreBox + Send + Sync>;
pub type OccupancyStoreFactory = Box<dyn Fn() -> OccupancyStoreBox + Send + Sync>;
