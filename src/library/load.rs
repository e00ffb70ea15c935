use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{
    fetch::fetch_all_liked_with_progress,
    model::{LikedEntry, UserProfile},
    source::LikedSource,
    store::SnapshotStore,
};
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Cache {
        path: PathBuf,
        cached_at: DateTime<Utc>,
    },
    Fresh {
        fetched_at: DateTime<Utc>,
        saved: Result<PathBuf, String>,
    },
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub entries: Vec<LikedEntry>,
    pub provenance: Provenance,
    pub user_key: String,
}

impl LoadOutcome {
    /// Human-readable note on where the entries came from.
    pub fn provenance_note(&self) -> String {
        let count = self.entries.len();
        match &self.provenance {
            Provenance::Cache { cached_at, .. } => format!(
                "Loaded {count} songs from cache (cached {})",
                local_stamp(cached_at)
            ),
            Provenance::Fresh {
                fetched_at,
                saved: Ok(_),
            } => format!(
                "Fetched {count} songs from Spotify (saved {})",
                local_stamp(fetched_at)
            ),
            Provenance::Fresh {
                saved: Err(reason), ..
            } => format!("Fetched {count} songs from Spotify (not cached: {reason})"),
        }
    }

    pub fn from_cache(&self) -> bool {
        matches!(self.provenance, Provenance::Cache { .. })
    }
}

fn local_stamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Loads the user's liked songs, preferring the newest snapshot unless
/// `force_refresh` is set. Cache problems never fail the call: an unreadable
/// snapshot counts as a miss and a failed write only changes the note.
#[allow(dead_code)]
pub async fn load(
    source: &dyn LikedSource,
    store: &SnapshotStore,
    user: &UserProfile,
    force_refresh: bool,
) -> Result<LoadOutcome, LoadError> {
    load_with_progress(source, store, user, force_refresh, |_| {}).await
}

pub async fn load_with_progress<F>(
    source: &dyn LikedSource,
    store: &SnapshotStore,
    user: &UserProfile,
    force_refresh: bool,
    on_page: F,
) -> Result<LoadOutcome, LoadError>
where
    F: FnMut(usize) + Send,
{
    let user_key = user.user_key();

    if !force_refresh {
        if let Some(path) = store.find_latest(&user_key) {
            match store.read_snapshot(&path) {
                Ok(snapshot) => {
                    info!(path = %path.display(), count = snapshot.entries.len(), "using cached liked songs");
                    return Ok(LoadOutcome {
                        entries: snapshot.entries,
                        provenance: Provenance::Cache {
                            path,
                            cached_at: snapshot.cached_at,
                        },
                        user_key,
                    });
                }
                Err(e) => warn!(path = %path.display(), "Ignoring unreadable snapshot: {e}"),
            }
        }
    }

    let entries = fetch_all_liked_with_progress(source, on_page).await?;
    let fetched_at = Utc::now();

    let saved = store
        .write_snapshot(&user_key, &entries)
        .map_err(|e| {
            warn!("Could not save liked songs snapshot: {e}");
            e.to_string()
        });

    Ok(LoadOutcome {
        entries,
        provenance: Provenance::Fresh { fetched_at, saved },
        user_key,
    })
}
