//! Domain types and the storage ports they are persisted through.

pub mod fare;
pub mod lot;
pub mod occupancy;
pub mod ports;
pub mod tariff;
