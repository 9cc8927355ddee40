use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_day_rate_window_boundaries() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type, lot, class, vehicle, time").unwrap();
    writeln!(file, "park, 1, 3, BUS-23, 2024-01-01T00:00:00Z").unwrap();
    writeln!(file, "park, 1, 3, BUS-24, 2024-01-01T00:00:00Z").unwrap();
    writeln!(file, "park, 1, 3, BUS-25, 2024-01-01T00:00:00Z").unwrap();
    writeln!(file, "unpark, 1, 3, BUS-23, 2024-01-01T23:00:00Z").unwrap();
    writeln!(file, "unpark, 1, 3, BUS-24, 2024-01-02T00:00:00Z").unwrap();
    writeln!(file, "unpark, 1, 3, BUS-25, 2024-01-02T00:01:00Z").unwrap();

    let mut cmd = Command::new(cargo_bin!("parkmeter"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("BUS-23,1,3,").and(predicate::str::contains(",1150\n")))
        .stdout(predicate::str::contains(",1200\n"))
        .stdout(predicate::str::contains(
            "BUS-25,1,3,2024-01-01T00:00:00Z,2024-01-02T00:01:00Z,1250",
        ));
}

#[test]
fn test_fractional_rate_precision() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type, lot, class, vehicle, time").unwrap();
    writeln!(file, "park, 1, 2, CAR-1, 2024-01-01T00:00:00Z").unwrap();
    writeln!(file, "unpark, 1, 2, CAR-1, 2024-01-02T04:01:00Z").unwrap();

    let mut cmd = Command::new(cargo_bin!("parkmeter"));
    cmd.arg(file.path());

    // 29 billable hours at 20.5
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",594.5\n"));
}

#[test]
fn test_capacity_exhaustion_and_reuse() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[[cells]]\nlot = 2\nclass = 1\nmax_capacity = 1").unwrap();
    writeln!(file, "[[tariffs]]\nlot = 2\nclass = 1\nmodel = \"hourly\"\nhourly_rate = 10.5").unwrap();
    let config = file.into_temp_path();

    let mut events = NamedTempFile::new().unwrap();
    writeln!(events, "type, lot, class, vehicle, time").unwrap();
    writeln!(events, "park, 2, 1, S-1, 2024-01-01T00:00:00Z").unwrap();
    writeln!(events, "park, 2, 1, S-2, 2024-01-01T00:05:00Z").unwrap(); // lot full
    writeln!(events, "unpark, 2, 1, S-1, 2024-01-01T02:10:00Z").unwrap();
    writeln!(events, "park, 2, 1, S-2, 2024-01-01T02:15:00Z").unwrap();
    writeln!(events, "unpark, 2, 1, S-2, 2024-01-01T04:15:00Z").unwrap();

    let mut cmd = Command::new(cargo_bin!("parkmeter"));
    cmd.arg(events.path()).arg("--config").arg(&config);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("No spots available"))
        .stdout(predicate::str::contains("S-1,2,1,2024-01-01T00:00:00Z,2024-01-01T02:10:00Z,31.5"))
        .stdout(predicate::str::contains("S-2,2,1,2024-01-01T02:15:00Z,2024-01-01T04:15:00Z,21"));
}
