//! Provisioning and tariff configuration.
//!
//! Capacity ceilings and tariffs are read once at startup, either from the
//! built-in seed (`ParkingConfig::default()`) or from a TOML file:
//!
//! ```toml
//! [[cells]]
//! lot = 1
//! class = 3
//! max_capacity = 20
//!
//! [[tariffs]]
//! lot = 1
//! class = 3
//! model = "day_rate"
//! hourly_rate = 50
//! day_rate = 500
//! window_hours = 24
//! ```
//!
//! Lots and vehicle classes use their numeric ids.

use crate::domain::fare::FareCalculator;
use crate::domain::lot::{LotId, VehicleClass};
use crate::domain::tariff::TariffRule;
use crate::error::{ParkingError, Result};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Ceiling for one `(lot, class)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    pub lot: LotId,
    pub class: VehicleClass,
    pub max_capacity: u32,
}

/// Pricing rule for one `(lot, class)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub lot: LotId,
    pub class: VehicleClass,
    #[serde(flatten)]
    pub rule: TariffRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingConfig {
    #[serde(default)]
    pub cells: Vec<CellConfig>,
    #[serde(default)]
    pub tariffs: Vec<TariffConfig>,
}

impl Default for ParkingConfig {
    fn default() -> Self {
        use LotId::{A, B};
        use VehicleClass::{Car, Motorcycle, Truck};

        let cell = |lot, class, max_capacity| CellConfig {
            lot,
            class,
            max_capacity,
        };
        let tariff = |lot, class, rule| TariffConfig { lot, class, rule };

        Self {
            cells: vec![
                cell(A, Motorcycle, 50),
                cell(A, Car, 30),
                cell(A, Truck, 20),
                cell(B, Motorcycle, 100),
                cell(B, Car, 80),
                cell(B, Truck, 40),
            ],
            tariffs: vec![
                tariff(A, Motorcycle, TariffRule::hourly(dec!(5))),
                tariff(A, Car, TariffRule::hourly(dec!(20.5))),
                tariff(A, Truck, TariffRule::day_rate(dec!(50), dec!(500), 24)),
                tariff(B, Motorcycle, TariffRule::hourly(dec!(10.5))),
                tariff(B, Car, TariffRule::first_hour(dec!(50), dec!(25))),
                tariff(B, Truck, TariffRule::hourly(dec!(100))),
            ],
        }
    }
}

impl ParkingConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ParkingError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::load_from_str(&content)
    }

    /// Load configuration from a TOML string. The result is validated.
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let config: ParkingConfig = toml::from_str(toml_content)
            .map_err(|e| ParkingError::ConfigError(format!("Failed to parse config TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects duplicate cells or tariffs and invalid tariff rules.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            if !seen.insert((cell.lot, cell.class)) {
                return Err(ParkingError::ConfigError(format!(
                    "Duplicate capacity for {} in {}",
                    cell.class, cell.lot
                )));
            }
        }

        let mut seen = HashSet::new();
        for tariff in &self.tariffs {
            if !seen.insert((tariff.lot, tariff.class)) {
                return Err(ParkingError::ConfigError(format!(
                    "Duplicate tariff for {} in {}",
                    tariff.class, tariff.lot
                )));
            }
            tariff.rule.validate().map_err(|e| {
                ParkingError::ConfigError(format!(
                    "Invalid tariff for {} in {}: {}",
                    tariff.class, tariff.lot, e
                ))
            })?;
        }
        Ok(())
    }

    pub fn tariff_table(&self) -> HashMap<(LotId, VehicleClass), TariffRule> {
        self.tariffs
            .iter()
            .map(|t| ((t.lot, t.class), t.rule))
            .collect()
    }

    pub fn fare_calculator(&self) -> FareCalculator {
        FareCalculator::new(self.tariff_table())
    }
}
