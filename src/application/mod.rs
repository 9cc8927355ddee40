//! Application layer orchestrating the domain.
//!
//! `AllocationManager` owns capacity accounting and `ParkingService` composes
//! it with occupancy records and fare calculation into park/unpark flows.

pub mod allocation;
pub mod service;
