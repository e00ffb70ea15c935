use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use rspotify::{
    model::{PlayableItem, PlaylistId, PlaylistItem, SimplifiedPlaylist, TrackId, UserId},
    prelude::*,
};
use tracing::info;

use super::{track_record, SpotifyHandle};
use crate::library::{source::LikedSource, LikedEntry, TrackRecord, UserProfile};

/// Maximum number of items the playlist endpoint accepts per request.
const PLAYLIST_ADD_BATCH: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub total_tracks: u32,
}

impl From<SimplifiedPlaylist> for PlaylistSummary {
    fn from(pl: SimplifiedPlaylist) -> Self {
        PlaylistSummary {
            id: pl.id.id().to_string(),
            name: pl.name,
            total_tracks: pl.tracks.total,
        }
    }
}

pub struct Library {
    spotify: SpotifyHandle,
}

impl Library {
    pub fn new(spotify: SpotifyHandle) -> Self {
        Library { spotify }
    }

    pub async fn get_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let sp = self.spotify.lock().await;
        let playlists: Vec<SimplifiedPlaylist> = sp.current_user_playlists().try_collect().await?;
        Ok(playlists.into_iter().map(PlaylistSummary::from).collect())
    }

    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackRecord>> {
        let sp = self.spotify.lock().await;
        let pid = PlaylistId::from_id(playlist_id)?;
        let items: Vec<PlaylistItem> = sp.playlist_items(pid, None, None).try_collect().await?;
        Ok(items
            .iter()
            .filter_map(|item| match &item.track {
                Some(PlayableItem::Track(track)) => Some(track_record(track)),
                _ => None,
            })
            .collect())
    }

    /// Creates a private playlist holding `tracks` in order; returns its id.
    pub async fn create_playlist(
        &self,
        user: &UserProfile,
        name: &str,
        description: &str,
        tracks: &[TrackRecord],
    ) -> Result<String> {
        let sp = self.spotify.lock().await;
        let user_id = UserId::from_id(user.id.as_str())?;
        let playlist = sp
            .user_playlist_create(user_id, name, Some(false), Some(false), Some(description))
            .await?;

        let ids: Vec<TrackId> = tracks
            .iter()
            .filter_map(|t| TrackId::from_id(t.id.as_str()).ok())
            .collect();
        for chunk in ids.chunks(PLAYLIST_ADD_BATCH) {
            let items: Vec<PlayableId> = chunk
                .iter()
                .map(|id| PlayableId::Track(id.as_ref()))
                .collect();
            sp.playlist_add_items(playlist.id.as_ref(), items, None)
                .await?;
        }

        info!(name, tracks = ids.len(), "created playlist");
        Ok(playlist.id.id().to_string())
    }

    pub async fn save_track(&self, track_id: &str) -> Result<()> {
        let sp = self.spotify.lock().await;
        let id = TrackId::from_id(track_id)?;
        sp.current_user_saved_tracks_add([id]).await?;
        Ok(())
    }
}

#[async_trait]
impl LikedSource for Library {
    async fn liked_page(&self, offset: u32, limit: u32) -> Result<Vec<LikedEntry>> {
        let sp = self.spotify.lock().await;
        let page = sp
            .current_user_saved_tracks_manual(None, Some(limit), Some(offset))
            .await?;
        Ok(page
            .items
            .iter()
            .map(|saved| LikedEntry {
                added_at: saved.added_at,
                track: track_record(&saved.track),
            })
            .collect())
    }
}
