use clap::Parser;
use miette::{IntoDiagnostic, Result};
use parkmeter::application::service::ParkingService;
use parkmeter::config::ParkingConfig;
use parkmeter::domain::fare::FareQuote;
use parkmeter::domain::lot::LotId;
use parkmeter::domain::ports::{CapacityStoreBox, OccupancyStoreBox};
use parkmeter::infrastructure::in_memory::{InMemoryCapacityStore, InMemoryOccupancyStore};
#[cfg(feature = "storage-rocksdb")]
use parkmeter::infrastructure::rocksdb::RocksDBStore;
use parkmeter::interfaces::csv::event_reader::{EventReader, EventType, ParkingEvent};
use parkmeter::interfaces::csv::receipt_writer::ReceiptWriter;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input parking events CSV file
    input: PathBuf,

    /// TOML file with capacity and tariffs. Defaults to the built-in lots.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log the free spaces of every lot once all events are replayed.
    #[arg(long)]
    free_spaces: bool,
}

fn in_memory_stores() -> (CapacityStoreBox, OccupancyStoreBox) {
    (
        Box::new(InMemoryCapacityStore::new()),
        Box::new(InMemoryOccupancyStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(CapacityStoreBox, OccupancyStoreBox)> {
    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(&db_path).into_diagnostic()?;
            info!(path = %db_path.display(), "using RocksDB storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(CapacityStoreBox, OccupancyStoreBox)> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

async fn apply(
    service: &ParkingService,
    event: ParkingEvent,
) -> parkmeter::error::Result<Option<FareQuote>> {
    match event.r#type {
        EventType::Park => {
            let ticket = service.park_at(event.park_request(), event.time).await?;
            debug!(
                vehicle = %ticket.vehicle,
                lot = ticket.parking_lot,
                class = %ticket.class,
                entry_time = %ticket.entry_time,
                "ticket issued"
            );
            Ok(None)
        }
        EventType::Unpark => service
            .unpark_at(event.unpark_request(), event.time)
            .await
            .map(Some),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ParkingConfig::load_from_file(path).into_diagnostic()?,
        None => ParkingConfig::default(),
    };

    let (capacity_store, occupancy_store) = open_stores(cli.db_path)?;
    let service = ParkingService::new(capacity_store, occupancy_store, config.fare_calculator());

    let created = service.provision(&config).await.into_diagnostic()?;
    info!(created, "capacity provisioned");

    // Replay events, one receipt per successful departure
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    let stdout = io::stdout();
    let mut writer = ReceiptWriter::new(stdout.lock());

    for event_result in reader.events() {
        match event_result {
            Ok(event) => match apply(&service, event).await {
                Ok(Some(quote)) => writer.write_receipt(&quote).into_diagnostic()?,
                Ok(None) => {}
                Err(e) => warn!("Error processing event: {}", e),
            },
            Err(e) => warn!("Error reading event: {}", e),
        }
    }

    writer.flush().into_diagnostic()?;

    if cli.free_spaces {
        for availability in service.free_spaces_all().await.into_diagnostic()? {
            info!(
                lot = availability.lot.map(LotId::name).unwrap_or_default(),
                motorcycles = availability.motorcycles,
                cars = availability.cars,
                trucks = availability.trucks,
                "free spaces"
            );
        }
    }
    Ok(())
}
