use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    /// Credited artists in API order.
    pub artists: Vec<String>,
    #[serde(default)]
    pub artist_ids: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub external_url: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl TrackRecord {
    pub fn artists_joined(&self) -> String {
        self.artists.join(", ")
    }

    /// Release year, when the release date starts with four digits.
    pub fn release_year(&self) -> Option<String> {
        let date = self.release_date.as_deref()?;
        let year = date.get(..4)?;
        year.chars().all(|c| c.is_ascii_digit()).then(|| year.to_string())
    }

    pub fn uri(&self) -> Option<String> {
        (!self.id.is_empty()).then(|| format!("spotify:track:{}", self.id))
    }

    /// Case-insensitive match against title, artists and album.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.album.to_lowercase().contains(&needle)
            || self
                .artists
                .iter()
                .any(|a| a.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedEntry {
    pub added_at: DateTime<Utc>,
    pub track: TrackRecord,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Key used to name this user's cache snapshots.
    pub fn user_key(&self) -> String {
        let name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id);
        format!("{}-{}", slug(name), slug(&self.id))
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

fn slug(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '\0'))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// `mm:ss` with zero-padded minutes.
pub fn format_duration(duration_ms: u64) -> String {
    let secs = duration_ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Inverse of [`format_duration`], accepting `m:ss` or `mm:ss`.
pub fn parse_duration(s: &str) -> Option<u64> {
    let (mins, secs) = s.trim().split_once(':')?;
    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    Some((mins * 60 + secs) * 1000)
}
