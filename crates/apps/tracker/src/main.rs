use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use foundation::GeoBounds;
use runtime::{
    RefreshDriver, ReplaySource, TrackerConfig, ViewUpdate, spawn_collector, spawn_poller,
};
use signal::sort_network_ids;
use store::{InMemoryStore, MeasurementStore, json};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use view::RefreshOutput;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Estimate wireless access point locations from signal observations"
)]
struct Args {
    /// Observation snapshot file (default: $TRACKER_DATA or tracker-data.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge a JSON observation snapshot into the data file
    Import { file: PathBuf },

    /// Replay JSON-lines scan batches through the collector
    Ingest {
        scans: PathBuf,

        /// Pace scans at the configured scan interval instead of replaying at once
        #[arg(long)]
        realtime: bool,

        /// Drop readings weaker than this (dBm)
        #[arg(long, allow_hyphen_values = true)]
        min_signal_dbm: Option<i32>,
    },

    /// Print one estimate per network visible in the viewport
    Summary {
        /// Viewport: south,north,west,east
        #[arg(long, allow_hyphen_values = true, value_parser = GeoBounds::parse)]
        bounds: Option<GeoBounds>,
    },

    /// Print one network's estimate with all supporting observations
    Detail { network_id: String },

    /// List known networks
    Networks,

    /// Delete every observation
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = TrackerConfig::from_env()?;
    if let Some(data) = args.data {
        config.data_path = data;
    }

    let rows = json::read_snapshot(&config.data_path)?;
    let store = Arc::new(InMemoryStore::from_observations(rows));

    match args.command {
        Command::Import { file } => {
            let text =
                std::fs::read_to_string(&file).map_err(|e| format!("read {file:?}: {e}"))?;
            let rows = json::from_json(&text)?;
            store.insert_many(&rows)?;
            save(&store, &config)?;
            info!(imported = rows.len(), total = store.len(), "import complete");
        }
        Command::Ingest {
            scans,
            realtime,
            min_signal_dbm,
        } => {
            if let Some(dbm) = min_signal_dbm {
                config.min_signal_dbm = dbm;
            }
            let file = std::fs::File::open(&scans).map_err(|e| format!("open {scans:?}: {e}"))?;
            let source = ReplaySource::from_reader(std::io::BufReader::new(file))?;
            let interval = if realtime {
                config.scan_interval
            } else {
                Duration::from_millis(1)
            };

            let collector = spawn_collector(store.clone(), &config);
            let poller = spawn_poller(source, interval, collector.sender());
            let forwarded = poller.await?;
            let stats = collector.finish().await?;
            save(&store, &config)?;
            info!(
                forwarded,
                stored = stats.observations_stored,
                without_fix = stats.batches_without_fix,
                failed = stats.failed_inserts,
                "ingest complete"
            );
            if let Some(e) = stats.last_error {
                return Err(e.into());
            }
        }
        Command::Summary { bounds } => {
            let (driver, mut updates) = RefreshDriver::new(store.clone(), 4);
            match bounds {
                Some(b) => driver.viewport_changed(b),
                None => driver.request_refresh(),
            };
            print_output(&next_render(&mut updates).await?)?;
        }
        Command::Detail { network_id } => {
            let (driver, mut updates) = RefreshDriver::new(store.clone(), 4);
            driver.select(network_id);
            print_output(&next_render(&mut updates).await?)?;
        }
        Command::Networks => {
            for id in sort_network_ids(store.distinct_network_ids()?) {
                println!("{id}");
            }
        }
        Command::Clear => {
            let (driver, _updates) = RefreshDriver::new(store.clone(), 1);
            driver.clear_all().await?;
            save(&store, &config)?;
            info!("all observations deleted");
        }
    }
    Ok(())
}

async fn next_render(
    updates: &mut mpsc::Receiver<ViewUpdate>,
) -> Result<RefreshOutput, Box<dyn Error>> {
    match updates.recv().await {
        Some(ViewUpdate::Render(output)) => Ok(output),
        Some(ViewUpdate::Failed(e)) => Err(e.into()),
        None => Err("refresh ended without a result".into()),
    }
}

fn print_output(output: &RefreshOutput) -> Result<(), Box<dyn Error>> {
    eprintln!("{}", output.status_line());
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn save(store: &InMemoryStore, config: &TrackerConfig) -> Result<(), Box<dyn Error>> {
    json::write_snapshot(&config.data_path, &store.snapshot())?;
    Ok(())
}
