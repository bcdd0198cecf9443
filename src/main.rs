//! CLI entry point for the GTFS-RT bus map feed.
//!
//! Serves the GeoJSON endpoint polled by the map front-end, or refreshes the
//! snapshot file once or on an interval without starting the server.

use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gtfs_rt_busmap::config::{
    DEFAULT_BIND_ADDR, DEFAULT_DATA_DIR, DEFAULT_FEED_URL, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SNAPSHOT_FILE, FeedConfig, SnapshotConfig,
};
use gtfs_rt_busmap::fetch::{BasicClient, FeedFetcher};
use gtfs_rt_busmap::server::{self, AppState};
use gtfs_rt_busmap::snapshot::SnapshotWriter;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gtfs_rt_busmap")]
#[command(about = "Serve live GTFS-RT bus positions as GeoJSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FeedArgs {
    /// VehiclePositions feed URL, or path to a saved .pb file
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Seconds to wait for the feed before giving up
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl FeedArgs {
    fn fetcher(&self) -> Result<FeedFetcher<BasicClient>> {
        let config = FeedConfig::new(&self.feed_url)?
            .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(FeedFetcher::from_config(&config)?)
    }
}

#[derive(Args)]
struct SnapshotArgs {
    /// Directory the snapshot file is written to
    #[arg(long, env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Snapshot file name inside the data directory
    #[arg(long, env = "SNAPSHOT_FILE", default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot_file: String,
}

impl SnapshotArgs {
    fn writer(&self) -> SnapshotWriter {
        SnapshotWriter::new(&SnapshotConfig {
            data_dir: self.data_dir.clone(),
            file_name: self.snapshot_file.clone(),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve GET /bus_data.geojson
    Serve {
        #[command(flatten)]
        feed: FeedArgs,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Address to listen on
        #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },
    /// Fetch the feed once and write the snapshot
    Snapshot {
        #[command(flatten)]
        feed: FeedArgs,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Only keep this vehicle id or route id
        #[arg(short, long)]
        bus: Option<String>,
    },
    /// Refresh the snapshot on a fixed interval
    Watch {
        #[command(flatten)]
        feed: FeedArgs,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Only keep this vehicle id or route id
        #[arg(short, long)]
        bus: Option<String>,

        /// Seconds between refreshes
        #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
        interval_secs: u64,

        /// Number of refreshes (0 = until interrupted)
        #[arg(short, long, default_value_t = 0)]
        num_samples: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            feed,
            snapshot,
            bind,
        } => {
            let fetcher = feed.fetcher()?;
            let writer = snapshot.writer();
            info!(
                source = %fetcher.source(),
                snapshot = %writer.path().display(),
                "Starting bus data service"
            );

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            server::serve(listener, AppState::new(fetcher, writer)).await?;
        }
        Commands::Snapshot {
            feed,
            snapshot,
            bus,
        } => {
            let fetcher = feed.fetcher()?;
            let writer = snapshot.writer();

            let collection = fetcher.fetch_and_transform(bus.as_deref()).await;
            writer.persist(&collection)?;

            info!(
                features = collection.len(),
                path = %writer.path().display(),
                "Snapshot saved"
            );
        }
        Commands::Watch {
            feed,
            snapshot,
            bus,
            interval_secs,
            num_samples,
        } => {
            let state = AppState::new(feed.fetcher()?, snapshot.writer());
            watch(&state, bus.as_deref(), interval_secs, num_samples).await;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/gtfs_rt_busmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gtfs_rt_busmap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

/// Refreshes the snapshot every `interval_secs`, `num_samples` times
/// (forever when zero).
#[tracing::instrument(skip(state))]
async fn watch(
    state: &AppState<BasicClient>,
    bus: Option<&str>,
    interval_secs: u64,
    num_samples: usize,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let mut sample_count = 0;

    if num_samples == 0 {
        info!(interval_secs, "Refreshing indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, interval_secs, "Starting refresh loop");
    }

    loop {
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        interval.tick().await;
        sample_count += 1;

        let collection = state.refresh(bus).await;
        info!(
            sample = sample_count,
            features = collection.len(),
            "Snapshot refreshed"
        );
    }

    info!(
        path = %state.snapshot().path().display(),
        "Finished refreshing snapshot"
    );
}
