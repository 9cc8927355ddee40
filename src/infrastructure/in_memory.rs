use crate::domain::lot::{CapacityCell, LotId, VehicleClass};
use crate::domain::occupancy::{Occupancy, VehicleId};
use crate::domain::ports::{CapacityStore, OccupancyStore};
use crate::error::{ParkingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

#[derive(Debug)]
struct Slot {
    max_capacity: u32,
    available: AtomicU32,
}

/// A thread-safe in-memory store for capacity cells.
///
/// The map is only write-locked while provisioning. Each cell keeps its own
/// `AtomicU32` counter and admits/releases with a compare-and-swap loop, so
/// updates to different cells never contend.
#[derive(Default, Clone)]
pub struct InMemoryCapacityStore {
    cells: Arc<RwLock<HashMap<(LotId, VehicleClass), Arc<Slot>>>>,
}

impl InMemoryCapacityStore {
    /// Creates a new, empty in-memory capacity store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, lot: LotId, class: VehicleClass) -> Result<Arc<Slot>> {
        let cells = self.cells.read().await;
        cells
            .get(&(lot, class))
            .cloned()
            .ok_or(ParkingError::UnknownCell(lot, class))
    }
}

#[async_trait]
impl CapacityStore for InMemoryCapacityStore {
    async fn provision(&self, lot: LotId, class: VehicleClass, max_capacity: u32) -> Result<()> {
        let mut cells = self.cells.write().await;
        match cells.entry((lot, class)) {
            Entry::Occupied(_) => Err(ParkingError::AlreadyProvisioned(lot, class)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Slot {
                    max_capacity,
                    available: AtomicU32::new(max_capacity),
                }));
                Ok(())
            }
        }
    }

    async fn read_availability(&self, lot: LotId, class: VehicleClass) -> Result<u32> {
        let slot = self.slot(lot, class).await?;
        Ok(slot.available.load(Ordering::Acquire))
    }

    async fn conditional_decrement(&self, lot: LotId, class: VehicleClass) -> Result<bool> {
        let slot = self.slot(lot, class).await?;
        Ok(slot
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok())
    }

    async fn conditional_increment(&self, lot: LotId, class: VehicleClass) -> Result<bool> {
        let slot = self.slot(lot, class).await?;
        let ceiling = slot.max_capacity;
        Ok(slot
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < ceiling).then_some(n + 1)
            })
            .is_ok())
    }

    async fn cells(&self) -> Result<Vec<CapacityCell>> {
        let cells = self.cells.read().await;
        let mut snapshot: Vec<CapacityCell> = cells
            .iter()
            .map(|(&(lot, class), slot)| CapacityCell {
                lot,
                class,
                max_capacity: slot.max_capacity,
                available: slot.available.load(Ordering::Acquire),
            })
            .collect();
        snapshot.sort_by_key(|cell| cell.key());
        Ok(snapshot)
    }
}

/// A thread-safe in-memory store for active occupancies.
///
/// Uses `Arc<RwLock<HashMap<VehicleId, Occupancy>>>`; inserts and removals
/// happen under the write lock so a vehicle can only be saved or taken once.
#[derive(Default, Clone)]
pub struct InMemoryOccupancyStore {
    occupancies: Arc<RwLock<HashMap<VehicleId, Occupancy>>>,
}

impl InMemoryOccupancyStore {
    /// Creates a new, empty in-memory occupancy store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OccupancyStore for InMemoryOccupancyStore {
    async fn save(&self, occupancy: Occupancy) -> Result<()> {
        let mut occupancies = self.occupancies.write().await;
        match occupancies.entry(occupancy.vehicle.clone()) {
            Entry::Occupied(entry) => Err(ParkingError::DuplicateKey(entry.key().to_string())),
            Entry::Vacant(entry) => {
                entry.insert(occupancy);
                Ok(())
            }
        }
    }

    async fn load(&self, vehicle: &VehicleId) -> Result<Option<Occupancy>> {
        let occupancies = self.occupancies.read().await;
        Ok(occupancies.get(vehicle).cloned())
    }

    async fn delete(&self, vehicle: &VehicleId) -> Result<Occupancy> {
        let mut occupancies = self.occupancies.write().await;
        occupancies
            .remove(vehicle)
            .ok_or_else(|| ParkingError::NotOccupied(vehicle.to_string()))
    }

    async fn all(&self) -> Result<Vec<Occupancy>> {
        let occupancies = self.occupancies.read().await;
        Ok(occupancies.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_in_memory_capacity_store() {
        let store = InMemoryCapacityStore::new();
        store.provision(LotId::A, VehicleClass::Car, 2).await.unwrap();

        assert_eq!(store.read_availability(LotId::A, VehicleClass::Car).await.unwrap(), 2);
        assert!(store.conditional_decrement(LotId::A, VehicleClass::Car).await.unwrap());
        assert!(store.conditional_decrement(LotId::A, VehicleClass::Car).await.unwrap());
        assert!(!store.conditional_decrement(LotId::A, VehicleClass::Car).await.unwrap());
        assert_eq!(store.read_availability(LotId::A, VehicleClass::Car).await.unwrap(), 0);

        assert!(store.conditional_increment(LotId::A, VehicleClass::Car).await.unwrap());
        assert!(store.conditional_increment(LotId::A, VehicleClass::Car).await.unwrap());
        assert!(!store.conditional_increment(LotId::A, VehicleClass::Car).await.unwrap());
        assert_eq!(store.read_availability(LotId::A, VehicleClass::Car).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_provision_twice_keeps_availability() {
        let store = InMemoryCapacityStore::new();
        store.provision(LotId::B, VehicleClass::Truck, 3).await.unwrap();
        store.conditional_decrement(LotId::B, VehicleClass::Truck).await.unwrap();

        let result = store.provision(LotId::B, VehicleClass::Truck, 10).await;
        assert!(matches!(result, Err(ParkingError::AlreadyProvisioned(..))));
        assert_eq!(store.read_availability(LotId::B, VehicleClass::Truck).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_cell() {
        let store = InMemoryCapacityStore::new();
        assert!(matches!(
            store.read_availability(LotId::A, VehicleClass::Motorcycle).await,
            Err(ParkingError::UnknownCell(LotId::A, VehicleClass::Motorcycle))
        ));
        assert!(matches!(
            store.conditional_decrement(LotId::A, VehicleClass::Motorcycle).await,
            Err(ParkingError::UnknownCell(..))
        ));
    }

    #[tokio::test]
    async fn test_cells_snapshot_is_sorted() {
        let store = InMemoryCapacityStore::new();
        store.provision(LotId::B, VehicleClass::Car, 1).await.unwrap();
        store.provision(LotId::A, VehicleClass::Truck, 1).await.unwrap();
        store.provision(LotId::A, VehicleClass::Motorcycle, 1).await.unwrap();

        let keys: Vec<_> = store.cells().await.unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            vec![
                (LotId::A, VehicleClass::Motorcycle),
                (LotId::A, VehicleClass::Truck),
                (LotId::B, VehicleClass::Car),
            ]
        );
    }

    #[tokio::test]
    async fn test_in_memory_occupancy_store() {
        let store = InMemoryOccupancyStore::new();
        let vehicle = VehicleId::new("KA-01").unwrap();
        let occupancy = Occupancy::new(vehicle.clone(), LotId::A, VehicleClass::Car, Utc::now());

        store.save(occupancy.clone()).await.unwrap();
        assert_eq!(store.load(&vehicle).await.unwrap(), Some(occupancy.clone()));
        assert!(matches!(
            store.save(occupancy.clone()).await,
            Err(ParkingError::DuplicateKey(_))
        ));
        assert_eq!(store.all().await.unwrap().len(), 1);

        assert_eq!(store.delete(&vehicle).await.unwrap(), occupancy);
        assert!(store.load(&vehicle).await.unwrap().is_none());
        assert!(matches!(
            store.delete(&vehicle).await,
            Err(ParkingError::NotOccupied(_))
        ));
    }
}
