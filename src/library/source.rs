use anyhow::Result;
use async_trait::async_trait;

use super::model::LikedEntry;

/// Paged access to the user's liked songs.
#[async_trait]
pub trait LikedSource: Send + Sync {
    async fn liked_page(&self, offset: u32, limit: u32) -> Result<Vec<LikedEntry>>;
}

/// Numeric audio attributes of one track. Any of them may be unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioAttributes {
    pub track_id: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub speechiness: Option<f64>,
    pub liveness: Option<f64>,
    pub tempo: Option<f64>,
    pub loudness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistGenres {
    pub artist_id: String,
    pub genres: Vec<String>,
}

/// Metadata lookups used by the taste analysis. Callers never pass more
/// than one batch (50 ids) at a time.
#[async_trait]
pub trait TasteSource: Send + Sync {
    async fn audio_attributes(&self, track_ids: &[String]) -> Result<Vec<AudioAttributes>>;
    async fn artist_genres(&self, artist_ids: &[String]) -> Result<Vec<ArtistGenres>>;
}
