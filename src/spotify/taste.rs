use anyhow::Result;
use async_trait::async_trait;
use rspotify::{
    model::{ArtistId, TrackId},
    prelude::*,
};

use super::SpotifyHandle;
use crate::library::source::{ArtistGenres, AudioAttributes, TasteSource};

/// Audio-feature and artist-genre lookups for the taste analysis.
pub struct Taste {
    spotify: SpotifyHandle,
}

impl Taste {
    pub fn new(spotify: SpotifyHandle) -> Self {
        Taste { spotify }
    }
}

#[async_trait]
impl TasteSource for Taste {
    async fn audio_attributes(&self, track_ids: &[String]) -> Result<Vec<AudioAttributes>> {
        let ids: Vec<TrackId> = track_ids
            .iter()
            .filter_map(|id| TrackId::from_id(id.as_str()).ok())
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let sp = self.spotify.lock().await;
        let features = sp.tracks_features(ids).await?.unwrap_or_default();
        Ok(features
            .into_iter()
            .map(|f| AudioAttributes {
                track_id: f.id.id().to_string(),
                danceability: Some(f.danceability as f64),
                energy: Some(f.energy as f64),
                valence: Some(f.valence as f64),
                acousticness: Some(f.acousticness as f64),
                instrumentalness: Some(f.instrumentalness as f64),
                speechiness: Some(f.speechiness as f64),
                liveness: Some(f.liveness as f64),
                tempo: Some(f.tempo as f64),
                loudness: Some(f.loudness as f64),
            })
            .collect())
    }

    async fn artist_genres(&self, artist_ids: &[String]) -> Result<Vec<ArtistGenres>> {
        let ids: Vec<ArtistId> = artist_ids
            .iter()
            .filter_map(|id| ArtistId::from_id(id.as_str()).ok())
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let sp = self.spotify.lock().await;
        let artists = sp.artists(ids).await?;
        Ok(artists
            .into_iter()
            .map(|a| ArtistGenres {
                artist_id: a.id.id().to_string(),
                genres: a.genres,
            })
            .collect())
    }
}
