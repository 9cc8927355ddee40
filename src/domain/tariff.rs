use crate::error::ParkingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};

/// Largest rate a tariff may charge per billable unit.
pub const MAX_RATE: Decimal = dec!(1000000000);

/// A monetary amount charged for a stay.
///
/// Wraps `rust_decimal::Decimal` so that fractional rates (e.g. `20.5`/hour)
/// never lose precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Fare(pub Decimal);

impl Fare {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rate applied to a number of billable units (hours or day periods).
    /// Saturates instead of overflowing.
    pub fn times(rate: Decimal, units: i64) -> Self {
        Self(rate.saturating_mul(Decimal::from(units)))
    }

    /// The smaller of two fares.
    pub fn capped_at(self, cap: Fare) -> Self {
        self.min(cap)
    }
}

impl Add for Fare {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fare {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Mul<i64> for Fare {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Pricing shape for one `(lot, vehicle class)` pair.
///
/// The three shapes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TariffRule {
    /// Every billable hour costs `hourly_rate`.
    Hourly { hourly_rate: Decimal },
    /// The first billable hour costs `first_hour_rate`, each further one
    /// `additional_hour_rate`.
    FirstHour {
        first_hour_rate: Decimal,
        additional_hour_rate: Decimal,
    },
    /// Hourly billing within the first `window_hours`; every further complete
    /// window costs `day_rate`.
    DayRate {
        hourly_rate: Decimal,
        day_rate: Decimal,
        window_hours: u32,
    },
}

impl TariffRule {
    pub fn hourly(hourly_rate: Decimal) -> Self {
        TariffRule::Hourly { hourly_rate }
    }

    pub fn first_hour(first_hour_rate: Decimal, additional_hour_rate: Decimal) -> Self {
        TariffRule::FirstHour {
            first_hour_rate,
            additional_hour_rate,
        }
    }

    pub fn day_rate(hourly_rate: Decimal, day_rate: Decimal, window_hours: u32) -> Self {
        TariffRule::DayRate {
            hourly_rate,
            day_rate,
            window_hours,
        }
    }

    /// Rejects negative or oversized rates, an empty day-rate window and a
    /// day rate above the hourly price of a full window.
    pub fn validate(&self) -> Result<(), ParkingError> {
        let rates = match self {
            TariffRule::Hourly { hourly_rate } => vec![*hourly_rate],
            TariffRule::FirstHour {
                first_hour_rate,
                additional_hour_rate,
            } => vec![*first_hour_rate, *additional_hour_rate],
            TariffRule::DayRate {
                hourly_rate,
                day_rate,
                window_hours,
            } => {
                if *window_hours == 0 {
                    return Err(ParkingError::ValidationError(
                        "Day-rate window must be at least one hour".to_string(),
                    ));
                }
                let full_window = hourly_rate.saturating_mul(Decimal::from(*window_hours));
                if *day_rate > full_window {
                    return Err(ParkingError::ValidationError(format!(
                        "Day rate {} exceeds {} hours at the hourly rate ({})",
                        day_rate, window_hours, full_window
                    )));
                }
                vec![*hourly_rate, *day_rate]
            }
        };

        if rates.iter().any(|rate| rate.is_sign_negative()) {
            return Err(ParkingError::ValidationError(
                "Tariff rates must not be negative".to_string(),
            ));
        }
        if rates.iter().any(|rate| *rate > MAX_RATE) {
            return Err(ParkingError::ValidationError(format!(
                "Tariff rates must not exceed {}",
                MAX_RATE
            )));
        }
        Ok(())
    }
}
