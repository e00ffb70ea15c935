use anyhow::{anyhow, Result};
use rspotify::{
    model::{AdditionalType, Market, PlayableItem, TrackId},
    prelude::*,
};
use tracing::info;

use super::SpotifyHandle;
use crate::app::state::NowPlaying;

pub struct Player {
    spotify: SpotifyHandle,
}

impl Player {
    pub fn new(spotify: SpotifyHandle) -> Self {
        Player { spotify }
    }

    pub async fn get_current_playback(&self) -> Result<Option<NowPlaying>> {
        let sp = self.spotify.lock().await;
        let additional = [AdditionalType::Track];
        let playback = sp
            .current_playback(Some(Market::FromToken), Some(additional.iter()))
            .await?;

        let Some(ctx) = playback else {
            return Ok(None);
        };
        let volume = ctx.device.volume_percent.map(|v| v.clamp(0, 100) as u8);
        if let Some(PlayableItem::Track(track)) = ctx.item {
            return Ok(Some(NowPlaying {
                name: track.name.clone(),
                artists: track.artists.iter().map(|a| a.name.clone()).collect(),
                album: track.album.name.clone(),
                duration_ms: track.duration.num_milliseconds().max(0) as u32,
                progress_ms: ctx
                    .progress
                    .map(|p| p.num_milliseconds().max(0) as u32)
                    .unwrap_or(0),
                is_playing: ctx.is_playing,
                device_volume: volume,
            }));
        }
        Ok(None)
    }

    /// Active device first, otherwise any device.
    async fn get_device_id(&self) -> Result<String> {
        let sp = self.spotify.lock().await;
        let devices = sp.device().await?;

        devices
            .iter()
            .find(|d| d.is_active)
            .or_else(|| devices.first())
            .and_then(|d| d.id.clone())
            .ok_or_else(|| {
                anyhow!("No Spotify device found! Open Spotify on your phone, desktop, or web browser first.")
            })
    }

    pub async fn play_tracks(&self, uris: &[String]) -> Result<()> {
        let device_id = self.get_device_id().await?;
        let sp = self.spotify.lock().await;

        let playable: Vec<PlayableId> = uris
            .iter()
            .filter_map(|uri| TrackId::from_uri(uri).ok())
            .map(PlayableId::Track)
            .collect();
        if playable.is_empty() {
            return Err(anyhow!("Nothing playable selected"));
        }

        sp.start_uris_playback(playable, Some(&device_id), None, None)
            .await?;
        info!("Playing {} tracks on device {device_id}", uris.len());
        Ok(())
    }

    pub async fn toggle_playback(&self, is_playing: bool) -> Result<()> {
        let sp = self.spotify.lock().await;
        if is_playing {
            sp.pause_playback(None).await?;
        } else {
            sp.resume_playback(None, None).await?;
        }
        Ok(())
    }

    pub async fn next_track(&self) -> Result<()> {
        let sp = self.spotify.lock().await;
        sp.next_track(None).await?;
        Ok(())
    }

    pub async fn previous_track(&self) -> Result<()> {
        let sp = self.spotify.lock().await;
        sp.previous_track(None).await?;
        Ok(())
    }

    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        let sp = self.spotify.lock().await;
        sp.volume(volume, None).await?;
        Ok(())
    }
}
