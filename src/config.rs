//! Runtime configuration for the fetcher and the snapshot writer.
//!
//! The binary fills these from CLI arguments and environment variables; tests
//! build them directly with fixture URLs and temporary paths.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::error::FeedError;

pub const DEFAULT_FEED_URL: &str = "https://gtfs.halifax.ca/realtime/Vehicle/VehiclePositions.pb";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_SNAPSHOT_FILE: &str = "bus_positions.geojson";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
/// Refresh interval of the map front-end, reused by `watch`.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Where the feed bytes come from.
///
/// Anything with an `http://` or `https://` scheme (any case) is fetched over
/// the network, everything else is treated as a path to a previously saved
/// `.pb` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Http(Url),
    File(PathBuf),
}

impl FromStr for FeedSource {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if has_http_scheme(s) {
            let url = Url::parse(s).map_err(|e| FeedError::InvalidSource {
                input: s.to_string(),
                reason: e.to_string(),
            })?;
            Ok(FeedSource::Http(url))
        } else if s.is_empty() {
            Err(FeedError::InvalidSource {
                input: s.to_string(),
                reason: "empty feed source".to_string(),
            })
        } else {
            Ok(FeedSource::File(PathBuf::from(s)))
        }
    }
}

fn has_http_scheme(s: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        s.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Http(url) => write!(f, "{url}"),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub source: FeedSource,
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
}

impl FeedConfig {
    pub fn new(source: &str) -> Result<Self, FeedError> {
        Ok(Self {
            source: source.parse()?,
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl SnapshotConfig {
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_name: DEFAULT_SNAPSHOT_FILE.to_string(),
        }
    }
}
