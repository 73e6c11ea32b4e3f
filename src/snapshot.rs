use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SnapshotError;

/// A curated news item as it appears in the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: String,
    #[serde(with = "iso_millis")]
    pub published_at: DateTime<Utc>,
}

/// The whole persisted state: both editions plus a freshness stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub am: Vec<NewsItem>,
    #[serde(default)]
    pub pm: Vec<NewsItem>,
}

impl Snapshot {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            am: Vec::new(),
            pm: Vec::new(),
        }
    }
}

/// Timestamps are written as `2024-01-01T09:00:00.000Z` so that re-serializing
/// a loaded snapshot reproduces the same bytes.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// File-backed store for the snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, returning `Ok(None)` when no file exists yet.
    pub fn try_load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    /// Read the snapshot, falling back to an empty one stamped `now`.
    pub fn load(&self, now: DateTime<Utc>) -> Snapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No snapshot at {}, starting empty", self.path.display());
                Snapshot::empty(now)
            }
            Err(e) => {
                warn!("Ignoring unreadable snapshot: {}", e);
                Snapshot::empty(now)
            }
        }
    }

    /// Replace the snapshot file. Readers see either the old or the new file, never a partial one.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut body = serde_json::to_string_pretty(snapshot)?;
        body.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source: std::io::Error| SnapshotError::Write {
            path: self.path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(body.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }
}
