use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, warn};

use super::{
    export::{entry_from_row, parse_liked_date},
    model::{LikedEntry, TrackRecord},
};
use crate::error::StoreError;

pub const SCHEMA_VERSION: u32 = 1;
const SNAPSHOT_MARKER: &str = "-liked-songs-";
const CURRENT_EXT: &str = "json";
const LEGACY_EXT: &str = "csv";

#[derive(Debug, Serialize)]
struct SnapshotDocument<'a> {
    schema_version: u32,
    user_key: &'a str,
    cached_at: DateTime<Utc>,
    entries: &'a [LikedEntry],
}

/// Read side of [`SnapshotDocument`]. Entries stay untyped so one bad field
/// costs that field, not the snapshot.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    schema_version: u32,
    cached_at: DateTime<Utc>,
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<LikedEntry>,
    pub cached_at: DateTime<Utc>,
}

/// Snapshot file found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Directory of per-user liked-song snapshots. Snapshots are written once and
/// never touched again; the newest one by modification time wins.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_snapshot(
        &self,
        user_key: &str,
        entries: &[LikedEntry],
    ) -> Result<PathBuf, StoreError> {
        self.write_snapshot_at(user_key, entries, Utc::now())
    }

    pub fn write_snapshot_at(
        &self,
        user_key: &str,
        entries: &[LikedEntry],
        now: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;

        let stamp = now.with_timezone(&Local).format("%Y%m%d_%H%M%S");
        let path = self
            .dir
            .join(format!("{user_key}{SNAPSHOT_MARKER}{stamp}.{CURRENT_EXT}"));

        let doc = SnapshotDocument {
            schema_version: SCHEMA_VERSION,
            user_key,
            cached_at: now,
            entries,
        };
        let json = serde_json::to_vec_pretty(&doc)?;

        write_new_file(&path, |file| file.write_all(&json))?;

        debug!(path = %path.display(), count = entries.len(), "wrote snapshot");
        Ok(path)
    }

    /// All snapshots for `user_key`, newest modification time first.
    pub fn list_snapshots(&self, user_key: &str) -> Result<Vec<SnapshotFile>, StoreError> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{user_key}{SNAPSHOT_MARKER}");
        let mut files = Vec::new();
        for entry in dir {
            let entry = entry?;
            let path = entry.path();
            if !is_snapshot_name(&path, &prefix) {
                continue;
            }
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            files.push(SnapshotFile {
                path,
                modified: meta.modified()?,
            });
        }

        files.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(files)
    }

    pub fn find_latest(&self, user_key: &str) -> Option<PathBuf> {
        match self.list_snapshots(user_key) {
            Ok(files) => files.into_iter().next().map(|f| f.path),
            Err(e) => {
                warn!("Could not list snapshots: {e}");
                None
            }
        }
    }

    pub fn read_snapshot(&self, path: &Path) -> Result<Snapshot, StoreError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if ext.eq_ignore_ascii_case(LEGACY_EXT) {
            return read_legacy_csv(path);
        }

        let content = fs::read(path)?;
        let doc: StoredDocument = serde_json::from_slice(&content)?;
        if doc.schema_version != SCHEMA_VERSION {
            return Err(StoreError::Schema(doc.schema_version));
        }

        let stored = doc.entries.len();
        let entries: Vec<LikedEntry> = doc.entries.iter().filter_map(entry_from_value).collect();
        if stored > 0 && entries.is_empty() {
            return Err(StoreError::Empty(path.display().to_string()));
        }
        if entries.len() < stored {
            debug!(skipped = stored - entries.len(), "skipped unreadable snapshot entries");
        }
        Ok(Snapshot {
            entries,
            cached_at: doc.cached_at,
        })
    }

    /// Deletes all but the newest `keep` snapshots; returns how many were removed.
    pub fn prune(&self, user_key: &str, keep: usize) -> Result<usize, StoreError> {
        let stale = self.list_snapshots(user_key)?.into_iter().skip(keep);
        let mut removed = 0;
        for file in stale {
            fs::remove_file(&file.path)?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Creates `path`, failing if it already exists, and fills it. A failed fill
/// removes the partial file.
pub(crate) fn write_new_file<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    let written = fill(&mut file).and_then(|()| file.sync_all());
    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(path = %path.display(), "Could not remove partial snapshot: {cleanup}");
        }
        return Err(e);
    }
    Ok(())
}

/// Maps one stored entry back to a [`LikedEntry`], with the same leniency as
/// the CSV reader: bad numbers become zero, a missing date becomes the epoch,
/// and an entry with neither a title nor a track id is dropped.
fn entry_from_value(value: &Value) -> Option<LikedEntry> {
    let track = value.get("track")?;
    let text = |key: &str| {
        track
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };
    let strings = |key: &str| -> Vec<String> {
        track
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    };

    let id = text("id");
    let name = text("name");
    if id.is_empty() && name.is_empty() {
        return None;
    }

    let popularity = match track.get("popularity") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().and_then(|p| u32::try_from(p).ok()).unwrap_or(0)),
    };
    let added_at = value
        .get("added_at")
        .and_then(Value::as_str)
        .and_then(parse_liked_date)
        .unwrap_or_default();

    Some(LikedEntry {
        added_at,
        track: TrackRecord {
            id,
            name,
            artists: strings("artists"),
            artist_ids: strings("artist_ids"),
            album: text("album"),
            duration_ms: track.get("duration_ms").and_then(Value::as_u64).unwrap_or(0),
            popularity,
            external_url: text("external_url"),
            release_date: track
                .get("release_date")
                .and_then(Value::as_str)
                .map(String::from),
        },
    })
}

fn is_snapshot_name(path: &Path, prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(stamp_and_ext) = name.strip_prefix(prefix) else {
        return false;
    };
    match stamp_and_ext.rsplit_once('.') {
        Some((stamp, ext)) => {
            !stamp.is_empty()
                && (ext.eq_ignore_ascii_case(CURRENT_EXT) || ext.eq_ignore_ascii_case(LEGACY_EXT))
        }
        None => false,
    }
}

fn read_legacy_csv(path: &Path) -> Result<Snapshot, StoreError> {
    let file = fs::File::open(path)?;
    let cached_at: DateTime<Utc> = file.metadata()?.modified()?.into();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut rows = 0usize;
    let mut entries = Vec::new();
    for record in rdr.records() {
        rows += 1;
        match record {
            Ok(row) => match entry_from_row(&row) {
                Some(entry) => entries.push(entry),
                None => debug!(row = rows, "skipping unreadable snapshot row"),
            },
            Err(e) => debug!(row = rows, "skipping malformed snapshot row: {e}"),
        }
    }

    if rows > 0 && entries.is_empty() {
        return Err(StoreError::Empty(path.display().to_string()));
    }
    Ok(Snapshot { entries, cached_at })
}
