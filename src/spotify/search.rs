use anyhow::Result;
use rspotify::{
    model::{SearchResult, SearchType},
    prelude::*,
};

use super::{track_record, SpotifyHandle};
use crate::library::TrackRecord;

pub struct Search {
    spotify: SpotifyHandle,
}

impl Search {
    pub fn new(spotify: SpotifyHandle) -> Self {
        Search { spotify }
    }

    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TrackRecord>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }
        let sp = self.spotify.lock().await;
        let result = sp
            .search(query, SearchType::Track, None, None, Some(limit), None)
            .await?;

        let tracks = match result {
            SearchResult::Tracks(page) => page.items.iter().map(track_record).collect(),
            _ => vec![],
        };
        Ok(tracks)
    }
}
