use anyhow::Result;
use rspotify::{
    model::FullTrack,
    prelude::*,
    AuthCodeSpotify, Config as SpotifyConfig, Credentials, OAuth,
};
use std::{collections::HashSet, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{Config, SCOPES};
use crate::error::AuthError;
use crate::library::{TrackRecord, UserProfile};

pub mod auth;
pub mod library;
pub mod player;
pub mod search;
pub mod taste;

pub type SpotifyHandle = Arc<Mutex<AuthCodeSpotify>>;

/// Builds the API client. Returns the authorize URL when no usable cached
/// token exists and the user still has to log in.
pub async fn build_spotify_client(config: &Config) -> Result<(SpotifyHandle, Option<String>)> {
    let creds = Credentials::new(&config.client_id, &config.client_secret);

    let oauth = OAuth {
        redirect_uri: config.redirect_uri.clone(),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        ..Default::default()
    };

    std::fs::create_dir_all(&config.data_dir)?;
    let sp_config = SpotifyConfig {
        cache_path: config.token_cache_path(),
        token_cached: true,
        token_refreshing: true,
        ..Default::default()
    };

    let spotify = AuthCodeSpotify::with_config(creds, oauth, sp_config);

    if let Ok(Some(token)) = spotify.read_token_cache(true).await {
        info!("Loaded cached token");
        if let Ok(mut guard) = spotify.token.lock().await {
            *guard = Some(token);
        }

        // make sure the cached refresh token still works
        match spotify.refresh_token().await {
            Ok(()) => return Ok((Arc::new(Mutex::new(spotify)), None)),
            Err(e) => {
                warn!("Cached token is no longer valid ({e}), logging in again");
                if let Ok(mut guard) = spotify.token.lock().await {
                    *guard = None;
                }
            }
        }
    }

    let url = spotify.get_authorize_url(false)?;
    info!("Auth URL generated");
    Ok((Arc::new(Mutex::new(spotify)), Some(url)))
}

/// Waits for the browser redirect and exchanges the code for a token.
pub async fn complete_auth(spotify: &SpotifyHandle, config: &Config) -> Result<()> {
    let addr = config.callback_addr()?;
    let path = config.callback_path();
    let expected_state = spotify.lock().await.oauth.state.clone();

    let redirect = auth::wait_for_auth_code(&addr, &path, &expected_state).await?;

    let sp = spotify.lock().await;
    sp.request_token(&redirect.code)
        .await
        .map_err(AuthError::Spotify)?;
    info!("Token saved to {}", config.token_cache_path().display());
    Ok(())
}

pub async fn current_user(spotify: &SpotifyHandle) -> Result<UserProfile> {
    let sp = spotify.lock().await;
    let user = sp.current_user().await?;
    Ok(UserProfile {
        id: user.id.id().to_string(),
        display_name: user.display_name,
    })
}

pub fn track_record(track: &FullTrack) -> TrackRecord {
    TrackRecord {
        id: track
            .id
            .as_ref()
            .map(|id| id.id().to_string())
            .unwrap_or_default(),
        name: track.name.clone(),
        artists: track.artists.iter().map(|a| a.name.clone()).collect(),
        artist_ids: track
            .artists
            .iter()
            .filter_map(|a| a.id.as_ref().map(|id| id.id().to_string()))
            .collect(),
        album: track.album.name.clone(),
        duration_ms: track.duration.num_milliseconds().max(0) as u64,
        popularity: Some(track.popularity),
        external_url: track
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_default(),
        release_date: track.album.release_date.clone(),
    }
}
