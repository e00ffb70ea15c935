use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::StringRecord;
use std::{fs, io::Write, path::Path};
use tracing::info;

use super::model::{format_duration, parse_duration, LikedEntry, TrackRecord};
use crate::error::ExportError;

pub const EXPORT_FILE_NAME: &str = "liked-songs-latest.csv";

pub const HEADER: [&str; 9] = [
    "#",
    "Artist(s)",
    "Title",
    "Duration",
    "Popularity",
    "Spotify URL",
    "Liked Date",
    "Album",
    "Track ID",
];

/// Writes `entries` to `path` as CSV, replacing any existing file.
pub fn export(entries: &[LikedEntry], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_entries(entries, file)?;
    info!(count = entries.len(), path = %path.display(), "exported liked songs");
    Ok(())
}

pub fn write_entries<W: Write>(entries: &[LikedEntry], out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for (i, entry) in entries.iter().enumerate() {
        wtr.write_record(entry_to_row(i + 1, entry))?;
    }
    wtr.flush()?;
    Ok(())
}

fn entry_to_row(position: usize, entry: &LikedEntry) -> [String; 9] {
    let track = &entry.track;
    [
        position.to_string(),
        track.artists_joined(),
        track.name.clone(),
        format_duration(track.duration_ms),
        track.popularity.unwrap_or(0).to_string(),
        track.external_url.clone(),
        entry.added_at.format("%Y-%m-%d").to_string(),
        track.album.clone(),
        track.id.clone(),
    ]
}

/// Maps one exported row back to an entry. Unparseable numeric fields
/// default to zero; a row without a title or track id is rejected.
///
/// Artists are split on `", "`, the separator the export joins them with, so
/// an artist whose own name contains `", "` (for example "Tyler, The
/// Creator") comes back as two artists. Artist ids and release dates are not
/// part of the row and come back empty.
pub fn entry_from_row(row: &StringRecord) -> Option<LikedEntry> {
    let field = |i: usize| row.get(i).map(str::trim).unwrap_or_default();

    let name = field(2);
    let id = field(8);
    if name.is_empty() && id.is_empty() {
        return None;
    }

    let artists = field(1)
        .split(", ")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect();

    Some(LikedEntry {
        added_at: parse_liked_date(field(6)).unwrap_or_default(),
        track: TrackRecord {
            id: id.to_string(),
            name: name.to_string(),
            artists,
            artist_ids: Vec::new(),
            album: field(7).to_string(),
            duration_ms: parse_duration(field(3)).unwrap_or(0),
            popularity: Some(field(4).parse().unwrap_or(0)),
            external_url: field(5).to_string(),
            release_date: None,
        },
    })
}

pub(crate) fn parse_liked_date(s: &str) -> Option<chrono::DateTime<Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}
