use crate::domain::fare::FareQuote;
use crate::error::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ReceiptRecord<'a> {
    vehicle: &'a str,
    lot: u8,
    class: u8,
    from: String,
    to: String,
    fare: String,
}

impl<'a> From<&'a FareQuote> for ReceiptRecord<'a> {
    fn from(quote: &'a FareQuote) -> Self {
        Self {
            vehicle: quote.vehicle.as_ref().map(|v| v.as_str()).unwrap_or_default(),
            lot: quote.lot.id(),
            class: quote.class.id(),
            from: quote.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            to: quote.exit_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            fare: quote.amount.to_string(),
        }
    }
}

/// Writes parking receipts as CSV (`vehicle,lot,class,from,to,fare`).
pub struct ReceiptWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReceiptWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_receipt(&mut self, quote: &FareQuote) -> Result<()> {
        self.writer.serialize(ReceiptRecord::from(quote))?;
        Ok(())
    }

    pub fn write_receipts<'a>(&mut self, quotes: impl IntoIterator<Item = &'a FareQuote>) -> Result<()> {
        for quote in quotes {
            self.write_receipt(quote)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lot::{LotId, VehicleClass};
    use crate::domain::occupancy::VehicleId;
    use crate::domain::tariff::Fare;
    use chrono::{DateTime, TimeDelta, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_receipts() {
        let entry = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let quote = FareQuote {
            vehicle: Some(VehicleId::new("KA-01").unwrap()),
            lot: LotId::A,
            class: VehicleClass::Car,
            entry_time: entry,
            exit_time: entry + TimeDelta::hours(28) + TimeDelta::minutes(1),
            amount: Fare::new(dec!(594.50)),
        };

        let mut buffer = Vec::new();
        {
            let mut writer = ReceiptWriter::new(&mut buffer);
            writer.write_receipts([&quote]).unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "vehicle,lot,class,from,to,fare\n\
             KA-01,1,2,2024-01-01T00:00:00Z,2024-01-02T04:01:00Z,594.5\n"
        );
    }
}
