//! Persistence of the most recent feature collection.
//!
//! Each call fully replaces the snapshot file. The new content is written to
//! a temporary file next to the target and renamed over it, so concurrent
//! writers resolve as last-writer-wins and readers never see a partial file.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::config::SnapshotConfig;
use crate::error::SnapshotError;
use crate::geojson::FeatureCollection;

const INDENT: &[u8] = b"    ";

/// Writes the feature collection to a single well-known file.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(config: &SnapshotConfig) -> Self {
        Self {
            path: config.path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the snapshot with `collection`, creating the directory if needed.
    pub fn persist(&self, collection: &FeatureCollection) -> Result<(), SnapshotError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|source| SnapshotError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let body = to_pretty_json(collection)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.write_error(source))?;
        tmp.write_all(&body)
            .and_then(|_| tmp.flush())
            .map_err(|source| self.write_error(source))?;
        tmp.persist(&self.path)
            .map_err(|source| SnapshotError::Persist {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            features = collection.len(),
            bytes = body.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Like [`persist`](Self::persist), but only logs a failure.
    pub fn persist_or_log(&self, collection: &FeatureCollection) {
        if let Err(e) = self.persist(collection) {
            error!(
                error = %e,
                kind = e.kind(),
                path = %self.path.display(),
                "Failed to save snapshot"
            );
        }
    }

    fn write_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Pretty-printed JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(buf)
}
