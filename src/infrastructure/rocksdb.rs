use crate::domain::lot::{CapacityCell, LotId, VehicleClass};
use crate::domain::occupancy::{Occupancy, VehicleId};
use crate::domain::ports::{CapacityStore, OccupancyStore};
use crate::error::{ParkingError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing capacity cells.
pub const CF_CAPACITY: &str = "capacity";
/// Column Family for storing active occupancies.
pub const CF_OCCUPANCY: &str = "occupancy";

/// Attempts of a conditional update that keeps losing the row lock.
const MAX_LOCK_ATTEMPTS: usize = 16;

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `CapacityCell` and `Occupancy` entities using
/// separate Column Families. Every conditional update runs inside a
/// pessimistic transaction: the key is locked with `get_for_update`, checked,
/// written and committed, so concurrent admits against the same cell
/// serialize.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB>,
}

fn cell_key(lot: LotId, class: VehicleClass) -> [u8; 2] {
    [lot.id(), class.id()]
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        ParkingError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn is_lock_contention(error: &ParkingError) -> bool {
    matches!(
        error,
        ParkingError::StorageError(e)
            if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain)
    )
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        ParkingError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("capacity" and "occupancy") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_capacity = ColumnFamilyDescriptor::new(CF_CAPACITY, Options::default());
        let cf_occupancy = ColumnFamilyDescriptor::new(CF_OCCUPANCY, Options::default());

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            vec![cf_capacity, cf_occupancy],
        )?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            ParkingError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    /// Applies `update` to the stored cell under a row lock and commits only
    /// if it reports a change. Lock timeouts are retried.
    fn update_cell<F>(&self, lot: LotId, class: VehicleClass, update: F) -> Result<bool>
    where
        F: Fn(&mut CapacityCell) -> bool,
    {
        let mut attempt = 1;
        loop {
            match self.try_update_cell(lot, class, &update) {
                Err(e) if is_lock_contention(&e) && attempt < MAX_LOCK_ATTEMPTS => {
                    attempt += 1;
                    std::thread::yield_now();
                }
                result => return result,
            }
        }
    }

    fn try_update_cell<F>(&self, lot: LotId, class: VehicleClass, update: &F) -> Result<bool>
    where
        F: Fn(&mut CapacityCell) -> bool,
    {
        let cf = self.cf(CF_CAPACITY)?;
        let key = cell_key(lot, class);
        let txn = self.db.transaction();

        let bytes = txn
            .get_for_update_cf(cf, key, true)?
            .ok_or(ParkingError::UnknownCell(lot, class))?;
        let mut cell: CapacityCell = decode(&bytes)?;

        // Dropping an uncommitted transaction rolls it back.
        if !update(&mut cell) {
            return Ok(false);
        }

        txn.put_cf(cf, key, encode(&cell)?)?;
        txn.commit()?;
        Ok(true)
    }

    fn insert_cell(&self, cell: CapacityCell) -> Result<()> {
        let cf = self.cf(CF_CAPACITY)?;
        let key = cell_key(cell.lot, cell.class);
        let txn = self.db.transaction();

        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            return Err(ParkingError::AlreadyProvisioned(cell.lot, cell.class));
        }
        txn.put_cf(cf, key, encode(&cell)?)?;
        txn.commit()?;
        Ok(())
    }

    fn insert_occupancy(&self, occupancy: &Occupancy) -> Result<()> {
        let cf = self.cf(CF_OCCUPANCY)?;
        let key = occupancy.vehicle.as_str().as_bytes();
        let txn = self.db.transaction();

        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            return Err(ParkingError::DuplicateKey(occupancy.vehicle.to_string()));
        }
        txn.put_cf(cf, key, encode(occupancy)?)?;
        txn.commit()?;
        Ok(())
    }

    fn take_occupancy(&self, vehicle: &VehicleId) -> Result<Occupancy> {
        let cf = self.cf(CF_OCCUPANCY)?;
        let key = vehicle.as_str().as_bytes();
        let txn = self.db.transaction();

        let bytes = txn
            .get_for_update_cf(cf, key, true)?
            .ok_or_else(|| ParkingError::NotOccupied(vehicle.to_string()))?;
        let occupancy = decode(&bytes)?;
        txn.delete_cf(cf, key)?;
        txn.commit()?;
        Ok(occupancy)
    }

    fn scan<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut items = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| {
                ParkingError::InternalError(Box::new(std::io::Error::other(format!(
                    "RocksDB iteration error: {}",
                    e
                ))))
            })?;
            items.push(decode(&value)?);
        }
        Ok(items)
    }
}

#[async_trait]
impl CapacityStore for RocksDBStore {
    async fn provision(&self, lot: LotId, class: VehicleClass, max_capacity: u32) -> Result<()> {
        self.insert_cell(CapacityCell::new(lot, class, max_capacity))
    }

    async fn read_availability(&self, lot: LotId, class: VehicleClass) -> Result<u32> {
        let cf = self.cf(CF_CAPACITY)?;
        let bytes = self
            .db
            .get_cf(cf, cell_key(lot, class))?
            .ok_or(ParkingError::UnknownCell(lot, class))?;
        let cell: CapacityCell = decode(&bytes)?;
        Ok(cell.available)
    }

    async fn conditional_decrement(&self, lot: LotId, class: VehicleClass) -> Result<bool> {
        self.update_cell(lot, class, CapacityCell::try_take)
    }

    async fn conditional_increment(&self, lot: LotId, class: VehicleClass) -> Result<bool> {
        self.update_cell(lot, class, CapacityCell::try_give_back)
    }

    async fn cells(&self) -> Result<Vec<CapacityCell>> {
        self.scan(CF_CAPACITY)
    }
}

#[async_trait]
impl OccupancyStore for RocksDBStore {
    async fn save(&self, occupancy: Occupancy) -> Result<()> {
        self.insert_occupancy(&occupancy)
    }

    async fn load(&self, vehicle: &VehicleId) -> Result<Option<Occupancy>> {
        let cf = self.cf(CF_OCCUPANCY)?;
        match self.db.get_cf(cf, vehicle.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, vehicle: &VehicleId) -> Result<Occupancy> {
        self.take_occupancy(vehicle)
    }

    async fn all(&self) -> Result<Vec<Occupancy>> {
        self.scan(CF_OCCUPANCY)
    }
}
