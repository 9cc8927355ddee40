//! Duration-to-price conversion.
//!
//! The calculator holds no mutable state and performs no I/O: the same
//! `(lot, class, duration)` always yields the same fare.

use super::lot::{LotId, VehicleClass};
use super::occupancy::VehicleId;
use super::tariff::{Fare, TariffRule};
use crate::error::{ParkingError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Number of hours billed for `duration`.
///
/// Any remainder past the last whole hour counts as one more hour. A zero or
/// negative duration bills nothing.
pub fn billable_hours(duration: TimeDelta) -> i64 {
    if duration <= TimeDelta::zero() {
        return 0;
    }
    let hours = duration.num_hours();
    if duration > TimeDelta::hours(hours) {
        hours + 1
    } else {
        hours
    }
}

/// Receipt value for a finished stay. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareQuote {
    pub vehicle: Option<VehicleId>,
    pub lot: LotId,
    pub class: VehicleClass,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub amount: Fare,
}

impl FareQuote {
    pub fn duration(&self) -> TimeDelta {
        self.exit_time - self.entry_time
    }
}

/// Maps `(lot, class, duration)` to a fare using an immutable tariff table.
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    tariffs: HashMap<(LotId, VehicleClass), TariffRule>,
}

impl FareCalculator {
    pub fn new(tariffs: HashMap<(LotId, VehicleClass), TariffRule>) -> Self {
        Self { tariffs }
    }

    pub fn tariff(&self, lot: LotId, class: VehicleClass) -> Result<&TariffRule> {
        self.tariffs
            .get(&(lot, class))
            .ok_or(ParkingError::UnknownTariff(lot, class))
    }

    /// Fare for parking `duration` in `lot` with a vehicle of `class`.
    pub fn calculate(&self, lot: LotId, class: VehicleClass, duration: TimeDelta) -> Result<Fare> {
        let rule = self.tariff(lot, class)?;
        Ok(Self::apply(rule, duration))
    }

    /// Prices the stay between `entry_time` and `exit_time`.
    pub fn quote(
        &self,
        lot: LotId,
        class: VehicleClass,
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
    ) -> Result<FareQuote> {
        let amount = self.calculate(lot, class, exit_time - entry_time)?;
        Ok(FareQuote {
            vehicle: None,
            lot,
            class,
            entry_time,
            exit_time,
            amount,
        })
    }

    /// Prices `duration` under a single rule.
    pub fn apply(rule: &TariffRule, duration: TimeDelta) -> Fare {
        match *rule {
            TariffRule::Hourly { hourly_rate } => Fare::times(hourly_rate, billable_hours(duration)),
            TariffRule::FirstHour {
                first_hour_rate,
                additional_hour_rate,
            } => match billable_hours(duration) {
                0 => Fare::ZERO,
                hours => Fare::new(first_hour_rate) + Fare::times(additional_hour_rate, hours - 1),
            },
            TariffRule::DayRate {
                hourly_rate,
                day_rate,
                window_hours,
            } => Self::apply_day_rate(hourly_rate, day_rate, window_hours, duration),
        }
    }

    // First window billed hourly in full, each later complete window at the day
    // rate, the trailing partial window hourly but never above one day rate.
    fn apply_day_rate(
        hourly_rate: rust_decimal::Decimal,
        day_rate: rust_decimal::Decimal,
        window_hours: u32,
        duration: TimeDelta,
    ) -> Fare {
        let window_hours = i64::from(window_hours.max(1));
        let window = TimeDelta::hours(window_hours);
        if duration <= window {
            return Fare::times(hourly_rate, billable_hours(duration));
        }

        let periods = duration.num_hours() / window_hours;
        let remainder = duration - TimeDelta::hours(periods * window_hours);

        let first_window = Fare::times(hourly_rate, window_hours);
        let full_days = Fare::times(day_rate, periods - 1);
        let partial = Fare::times(hourly_rate, billable_hours(remainder))
            .capped_at(Fare::new(day_rate));

        first_window + full_days + partial
    }
}
