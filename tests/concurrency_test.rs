use chrono::Utc;
use parkmeter::application::service::{ParkRequest, ParkingService, UnparkRequest};
use parkmeter::config::{CellConfig, ParkingConfig};
use parkmeter::domain::lot::{LotId, VehicleClass};
use parkmeter::domain::occupancy::VehicleId;
use parkmeter::error::ParkingError;
use parkmeter::infrastructure::in_memory::{InMemoryCapacityStore, InMemoryOccupancyStore};
use std::sync::Arc;

async fn service(max_capacity: u32) -> Arc<ParkingService> {
    let mut config = ParkingConfig::default();
    config.cells = vec![CellConfig {
        lot: LotId::B,
        class: VehicleClass::Car,
        max_capacity,
    }];

    let service = ParkingService::new(
        Box::new(InMemoryCapacityStore::new()),
        Box::new(InMemoryOccupancyStore::new()),
        config.fare_calculator(),
    );
    service.provision(&config).await.unwrap();
    Arc::new(service)
}

fn park(vehicle: String) -> ParkRequest {
    ParkRequest {
        lot: LotId::B,
        class: VehicleClass::Car,
        vehicle: VehicleId::new(vehicle).unwrap(),
        display_name: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_parks_fill_exactly_to_capacity() {
    let service = service(25).await;

    let handles: Vec<_> = (0..200)
        .map(|n| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.park(park(format!("CAR-{n}"))).await })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(ParkingError::NoCapacity(LotId::B, VehicleClass::Car)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(admitted, 25);
    assert_eq!(service.occupancies().await.unwrap().len(), 25);
    assert_eq!(service.free_spaces(LotId::B).await.unwrap().cars, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_unparks_release_once() {
    let service = service(3).await;
    service.park(park("DUP".to_string())).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .unpark_at(
                        UnparkRequest {
                            lot: LotId::B,
                            class: VehicleClass::Car,
                            vehicle: VehicleId::new("DUP").unwrap(),
                        },
                        Utc::now(),
                    )
                    .await
            })
        })
        .collect();

    let mut released = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => released += 1,
            Err(ParkingError::NotOccupied(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(released, 1);
    assert_eq!(service.free_spaces(LotId::B).await.unwrap().cars, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_duplicate_parks_admit_once() {
    let service = service(20).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.park(park("SAME".to_string())).await })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(ParkingError::DuplicateKey(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(admitted, 1);
    // Losing attempts handed their unit back
    assert_eq!(service.free_spaces(LotId::B).await.unwrap().cars, 19);
}
