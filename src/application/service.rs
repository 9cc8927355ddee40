use super::allocation::AllocationManager;
use crate::config::ParkingConfig;
use crate::domain::fare::{FareCalculator, FareQuote};
use crate::domain::lot::{LotId, VehicleClass};
use crate::domain::occupancy::{Occupancy, VehicleId};
use crate::domain::ports::{CapacityStoreBox, OccupancyStoreBox};
use crate::error::{ParkingError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ParkRequest {
    pub lot: LotId,
    pub class: VehicleClass,
    pub vehicle: VehicleId,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnparkRequest {
    pub lot: LotId,
    pub class: VehicleClass,
    pub vehicle: VehicleId,
}

/// Handed out when a vehicle is admitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub vehicle: VehicleId,
    pub parking_lot: &'static str,
    pub class: VehicleClass,
    pub entry_time: DateTime<Utc>,
}

/// Free spots per vehicle class in one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Availability {
    pub lot: Option<LotId>,
    pub motorcycles: u32,
    pub cars: u32,
    pub trucks: u32,
}

impl Availability {
    fn add(&mut self, class: VehicleClass, free: u32) {
        match class {
            VehicleClass::Motorcycle => self.motorcycles += free,
            VehicleClass::Car => self.cars += free,
            VehicleClass::Truck => self.trucks += free,
        }
    }

    pub fn for_class(&self, class: VehicleClass) -> u32 {
        match class {
            VehicleClass::Motorcycle => self.motorcycles,
            VehicleClass::Car => self.cars,
            VehicleClass::Truck => self.trucks,
        }
    }
}

/// Composes capacity allocation, occupancy records and fare calculation.
///
/// `park` and `unpark` are all-or-nothing: if the second step fails the first
/// one is undone before the error is returned.
pub struct ParkingService {
    allocation: AllocationManager,
    occupancies: OccupancyStoreBox,
    fares: FareCalculator,
}

impl ParkingService {
    /// Creates a new `ParkingService` instance.
    ///
    /// # Arguments
    ///
    /// * `capacity_store` - The store for capacity cells.
    /// * `occupancy_store` - The store for active occupancies.
    /// * `fares` - The tariff table used on departure.
    pub fn new(
        capacity_store: CapacityStoreBox,
        occupancy_store: OccupancyStoreBox,
        fares: FareCalculator,
    ) -> Self {
        Self {
            allocation: AllocationManager::new(capacity_store),
            occupancies: occupancy_store,
            fares,
        }
    }

    pub fn allocation(&self) -> &AllocationManager {
        &self.allocation
    }

    /// Provisions every configured cell that does not exist yet and returns
    /// how many were created. Existing cells keep their availability.
    pub async fn provision(&self, config: &ParkingConfig) -> Result<usize> {
        let mut created = 0;
        for cell in &config.cells {
            match self
                .allocation
                .provision(cell.lot, cell.class, cell.max_capacity)
                .await
            {
                Ok(()) => created += 1,
                Err(ParkingError::AlreadyProvisioned(lot, class)) => {
                    debug!(%lot, %class, "capacity already provisioned, keeping stored state");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    pub async fn park(&self, request: ParkRequest) -> Result<Ticket> {
        self.park_at(request, Utc::now()).await
    }

    /// Admits the vehicle and records its occupancy with `entry_time`.
    pub async fn park_at(&self, request: ParkRequest, entry_time: DateTime<Utc>) -> Result<Ticket> {
        let ParkRequest {
            lot,
            class,
            vehicle,
            display_name,
        } = request;

        if self.occupancies.load(&vehicle).await?.is_some() {
            return Err(ParkingError::DuplicateKey(vehicle.to_string()));
        }

        let reservation = self.allocation.admit(lot, class).await?;

        let occupancy = Occupancy::new(vehicle.clone(), reservation.lot, reservation.class, entry_time)
            .with_display_name(display_name);
        if let Err(e) = self.occupancies.save(occupancy).await {
            if let Err(rollback) = self.allocation.release(lot, class).await {
                warn!(%vehicle, %lot, %class, error = %rollback, "failed to return capacity after rejected park");
            }
            return Err(e);
        }

        debug!(%vehicle, %lot, %class, "vehicle parked");
        Ok(Ticket {
            vehicle,
            parking_lot: lot.name(),
            class,
            entry_time,
        })
    }

    pub async fn unpark(&self, request: UnparkRequest) -> Result<FareQuote> {
        self.unpark_at(request, Utc::now()).await
    }

    /// Removes the occupancy, returns its capacity unit and prices the stay
    /// up to `exit_time`.
    pub async fn unpark_at(
        &self,
        request: UnparkRequest,
        exit_time: DateTime<Utc>,
    ) -> Result<FareQuote> {
        let UnparkRequest {
            lot,
            class,
            vehicle,
        } = request;

        match self.occupancies.load(&vehicle).await? {
            Some(occupancy) if occupancy.holds(lot, class) => {}
            _ => return Err(ParkingError::NotOccupied(vehicle.to_string())),
        }
        // Fail before touching any state when the pair cannot be priced.
        self.fares.tariff(lot, class)?;

        let occupancy = self.occupancies.delete(&vehicle).await?;
        if !occupancy.holds(lot, class) {
            self.restore(occupancy).await?;
            return Err(ParkingError::NotOccupied(vehicle.to_string()));
        }

        if let Err(e) = self.allocation.release(lot, class).await {
            warn!(%vehicle, %lot, %class, error = %e, "capacity release rejected, keeping occupancy");
            self.restore(occupancy).await?;
            return Err(e);
        }

        let mut quote = self
            .fares
            .quote(lot, class, occupancy.entry_time, exit_time)?;
        quote.vehicle = Some(vehicle);

        debug!(vehicle = ?quote.vehicle, %lot, %class, fare = %quote.amount, "vehicle left");
        Ok(quote)
    }

    /// Puts a taken occupancy back. A failure here means the vehicle still
    /// holds a unit that no record accounts for, so it is surfaced.
    async fn restore(&self, occupancy: Occupancy) -> Result<()> {
        let vehicle = occupancy.vehicle.clone();
        self.occupancies.save(occupancy).await.map_err(|e| {
            warn!(%vehicle, error = %e, "failed to restore occupancy");
            ParkingError::InternalError(
                format!("Occupancy of vehicle {} could not be restored: {}", vehicle, e).into(),
            )
        })
    }

    /// Prices a stay without touching capacity or occupancy.
    pub fn quote(
        &self,
        lot: LotId,
        class: VehicleClass,
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
    ) -> Result<FareQuote> {
        self.fares.quote(lot, class, entry_time, exit_time)
    }

    /// Free spots in `lot`. Classes without provisioned capacity count as zero.
    pub async fn free_spaces(&self, lot: LotId) -> Result<Availability> {
        let cells = self.allocation.snapshot().await?;
        if !cells.iter().any(|cell| cell.lot == lot) {
            return Err(ParkingError::ValidationError(format!(
                "{} has no provisioned capacity",
                lot
            )));
        }

        let mut availability = Availability {
            lot: Some(lot),
            ..Availability::default()
        };
        for cell in cells.iter().filter(|cell| cell.lot == lot) {
            availability.add(cell.class, cell.available);
        }
        Ok(availability)
    }

    /// Free spots for every lot with provisioned capacity.
    pub async fn free_spaces_all(&self) -> Result<Vec<Availability>> {
        let cells = self.allocation.snapshot().await?;
        let mut result = Vec::new();
        for lot in LotId::ALL {
            let mut availability = Availability {
                lot: Some(lot),
                ..Availability::default()
            };
            let mut provisioned = false;
            for cell in cells.iter().filter(|cell| cell.lot == lot) {
                availability.add(cell.class, cell.available);
                provisioned = true;
            }
            if provisioned {
                result.push(availability);
            }
        }
        Ok(result)
    }

    pub async fn occupancies(&self) -> Result<Vec<Occupancy>> {
        self.occupancies.all().await
    }
}
