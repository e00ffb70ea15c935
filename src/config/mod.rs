use dotenvy::dotenv;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Permissions requested during login. Covers library reads, playlist
/// creation and playback control.
pub const SCOPES: &[&str] = &[
    "user-library-read",
    "user-library-modify",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-private",
    "playlist-modify-public",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "user-read-private",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // a missing .env is fine when the variables are exported

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let redirect_uri = required("SPOTIFY_REDIRECT_URI")?;
        if !redirect_uri.starts_with("http://") && !redirect_uri.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "SPOTIFY_REDIRECT_URI",
                reason: "must be an http(s) URL".to_string(),
            });
        }

        let data_dir = lookup("LIKESHELF_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
                path.push("likeshelf");
                path
            });

        Ok(Config {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri,
            data_dir,
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    pub fn token_cache_path(&self) -> PathBuf {
        self.data_dir.join("token.json")
    }

    /// `host:port` the OAuth callback listener binds to, taken from the redirect URI.
    pub fn callback_addr(&self) -> Result<String, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name: "SPOTIFY_REDIRECT_URI",
            reason: reason.to_string(),
        };

        let rest = self
            .redirect_uri
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| invalid("missing scheme"))?;
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(invalid("missing host"));
        }

        match authority.rsplit_once(':') {
            Some((host, port)) if port.parse::<u16>().is_ok() => Ok(format!("{host}:{port}")),
            Some(_) => Err(invalid("port is not a number")),
            None => Ok(format!("{authority}:80")),
        }
    }

    /// Path component of the redirect URI, e.g. `/callback`.
    pub fn callback_path(&self) -> String {
        self.redirect_uri
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|i| &rest[i..]))
            .and_then(|path| path.split('?').next())
            .unwrap_or("/")
            .to_string()
    }
}
