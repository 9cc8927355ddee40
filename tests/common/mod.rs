use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::fs::File;
use std::io::Error;
use std::path::Path;

fn timestamp(offset: TimeDelta) -> String {
    let start = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap(); // 2024-01-01
    (start + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Writes `vehicles` park/unpark pairs for lot 2 cars, each staying `n % 5 + 1` hours.
pub fn generate_events(path: &Path, vehicles: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "lot", "class", "vehicle", "time"])?;

    for i in 0..vehicles {
        let vehicle = format!("CAR-{i}");
        let entry = TimeDelta::minutes(i as i64);
        let exit = entry + TimeDelta::hours((i % 5) as i64 + 1);
        wtr.write_record(["park", "2", "2", &vehicle, &timestamp(entry)])?;
        wtr.write_record(["unpark", "2", "2", &vehicle, &timestamp(exit)])?;
    }

    wtr.flush()?;
    Ok(())
}
