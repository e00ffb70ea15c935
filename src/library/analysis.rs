use chrono::{DateTime, Local, Utc};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};
use strum_macros::{Display, EnumIter};
use tracing::{info, warn};

use super::{
    model::TrackRecord,
    source::{AudioAttributes, TasteSource},
};
use crate::error::ExportError;

pub const BATCH_SIZE: usize = 50;
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Attribute {
    Danceability,
    Energy,
    Valence,
    Acousticness,
    Instrumentalness,
    Speechiness,
    Liveness,
    Tempo,
    Loudness,
}

impl Attribute {
    fn value(self, a: &AudioAttributes) -> Option<f64> {
        match self {
            Attribute::Danceability => a.danceability,
            Attribute::Energy => a.energy,
            Attribute::Valence => a.valence,
            Attribute::Acousticness => a.acousticness,
            Attribute::Instrumentalness => a.instrumentalness,
            Attribute::Speechiness => a.speechiness,
            Attribute::Liveness => a.liveness,
            Attribute::Tempo => a.tempo,
            Attribute::Loudness => a.loudness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl AttributeStats {
    fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut stats: Option<AttributeStats> = None;
        let mut sum = 0.0;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            sum += v;
            stats = Some(match stats {
                None => AttributeStats { average: v, min: v, max: v, samples: 1 },
                Some(s) => AttributeStats {
                    average: 0.0,
                    min: s.min.min(v),
                    max: s.max.max(v),
                    samples: s.samples + 1,
                },
            });
        }
        stats.map(|s| AttributeStats {
            average: sum / s.samples as f64,
            ..s
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct TasteAnalysis {
    /// What was analysed, e.g. `liked` or `playlist`.
    pub kind: String,
    pub tracks_analyzed: usize,
    pub generated_at: DateTime<Utc>,
    pub attributes: Vec<(Attribute, AttributeStats)>,
    pub top_genres: Vec<RankedCount>,
    pub top_artists: Vec<RankedCount>,
    pub top_albums: Vec<RankedCount>,
    pub top_years: Vec<RankedCount>,
    pub observations: Vec<String>,
    pub skipped_batches: usize,
}

impl TasteAnalysis {
    pub fn stats(&self, attribute: Attribute) -> Option<&AttributeStats> {
        self.attributes
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, s)| s)
    }
}

/// Counts occurrences while remembering first-seen order, so that a stable
/// sort by count keeps earlier names ahead on ties.
#[derive(Debug, Default)]
struct Tally {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match self.index.get(name) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(name.to_string(), self.order.len());
                self.order.push((name.to_string(), 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<RankedCount> {
        self.order.sort_by(|a, b| b.1.cmp(&a.1));
        self.order
            .into_iter()
            .take(n)
            .map(|(name, count)| RankedCount { name, count })
            .collect()
    }
}

/// Analyses the first `limit` tracks. Metadata is looked up in batches of
/// [`BATCH_SIZE`]; a failed batch is logged and skipped.
pub async fn analyze(
    source: &dyn TasteSource,
    tracks: &[TrackRecord],
    limit: usize,
    kind: &str,
) -> TasteAnalysis {
    let tracks = &tracks[..tracks.len().min(limit)];
    let mut skipped_batches = 0;

    let track_ids: Vec<String> = tracks
        .iter()
        .filter(|t| !t.id.is_empty())
        .map(|t| t.id.clone())
        .collect();
    let mut features = Vec::new();
    for batch in track_ids.chunks(BATCH_SIZE) {
        match source.audio_attributes(batch).await {
            Ok(found) => features.extend(found),
            Err(e) => {
                skipped_batches += 1;
                warn!("Skipping audio attribute batch: {e}");
            }
        }
    }

    let mut seen = HashSet::new();
    let artist_ids: Vec<String> = tracks
        .iter()
        .flat_map(|t| t.artist_ids.iter())
        .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
        .cloned()
        .collect();
    let mut genres_by_artist: HashMap<String, Vec<String>> = HashMap::new();
    for batch in artist_ids.chunks(BATCH_SIZE) {
        match source.artist_genres(batch).await {
            Ok(found) => {
                for a in found {
                    genres_by_artist.insert(a.artist_id, a.genres);
                }
            }
            Err(e) => {
                skipped_batches += 1;
                warn!("Skipping artist genre batch: {e}");
            }
        }
    }

    let analysis = summarize(tracks, &features, &genres_by_artist, kind, skipped_batches);
    info!(
        kind,
        tracks = analysis.tracks_analyzed,
        skipped = analysis.skipped_batches,
        "taste analysis finished"
    );
    analysis
}

fn summarize(
    tracks: &[TrackRecord],
    features: &[AudioAttributes],
    genres_by_artist: &HashMap<String, Vec<String>>,
    kind: &str,
    skipped_batches: usize,
) -> TasteAnalysis {
    use strum::IntoEnumIterator;

    let attributes: Vec<(Attribute, AttributeStats)> = Attribute::iter()
        .filter_map(|attr| {
            AttributeStats::from_values(features.iter().filter_map(|f| attr.value(f)))
                .map(|s| (attr, s))
        })
        .collect();

    let mut genres = Tally::default();
    let mut artists = Tally::default();
    let mut albums = Tally::default();
    let mut years = Tally::default();
    for track in tracks {
        for artist_id in &track.artist_ids {
            for genre in genres_by_artist.get(artist_id).into_iter().flatten() {
                genres.add(genre);
            }
        }
        for artist in &track.artists {
            artists.add(artist);
        }
        albums.add(&track.album);
        if let Some(year) = track.release_year() {
            years.add(&year);
        }
    }

    let mut analysis = TasteAnalysis {
        kind: kind.to_string(),
        tracks_analyzed: tracks.len(),
        generated_at: Utc::now(),
        attributes,
        top_genres: genres.top(TOP_N),
        top_artists: artists.top(TOP_N),
        top_albums: albums.top(TOP_N),
        top_years: years.top(TOP_N),
        observations: Vec::new(),
        skipped_batches,
    };
    analysis.observations = observations(&analysis);
    analysis
}

/// Fixed-threshold remarks about the averaged attributes.
pub fn observations(analysis: &TasteAnalysis) -> Vec<String> {
    let avg = |a: Attribute| analysis.stats(a).map(|s| s.average);
    let mut out = Vec::new();

    if let Some(d) = avg(Attribute::Danceability) {
        out.push(
            if d > 0.7 {
                "You love music that makes you move: your picks are highly danceable."
            } else if d < 0.3 {
                "You prefer music for listening over dancing."
            } else {
                "Your music balances danceable tracks with more laid-back ones."
            }
            .to_string(),
        );
    }
    if let Some(e) = avg(Attribute::Energy) {
        out.push(
            if e > 0.7 {
                "High energy is your thing: loud, fast and intense tracks dominate."
            } else if e < 0.3 {
                "You gravitate towards calm, low-energy music."
            } else {
                "Your energy levels are moderate, a mix of mellow and lively tracks."
            }
            .to_string(),
        );
    }
    if let Some(v) = avg(Attribute::Valence) {
        out.push(
            if v > 0.6 {
                "Your music is mostly upbeat and positive."
            } else if v < 0.4 {
                "You lean towards melancholic or moody music."
            } else {
                "Your music sits between happy and sad moods."
            }
            .to_string(),
        );
    }
    if let Some(a) = avg(Attribute::Acousticness) {
        if a > 0.5 {
            out.push("You enjoy acoustic sounds over electronic production.".to_string());
        }
    }
    if let Some(t) = avg(Attribute::Tempo) {
        out.push(
            if t > 120.0 {
                format!("You like fast tempos (average {t:.0} BPM).")
            } else if t < 90.0 {
                format!("You prefer slower tempos (average {t:.0} BPM).")
            } else {
                format!("Your tracks move at a moderate pace (average {t:.0} BPM).")
            },
        );
    }
    if let Some(top) = analysis.top_genres.first() {
        out.push(format!(
            "Your top genre is {} ({} tracks).",
            top.name, top.count
        ));
    }

    out
}

/// Writes `music_analysis_{kind}_{timestamp}.csv` into `dir`.
pub fn export_analysis(analysis: &TasteAnalysis, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let stamp = analysis
        .generated_at
        .with_timezone(&Local)
        .format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("music_analysis_{}_{stamp}.csv", analysis.kind));

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&path)?;
    let blank = ["", "", ""];
    let tracks = analysis.tracks_analyzed.to_string();
    let generated = analysis
        .generated_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    wtr.write_record(["Music Analysis Summary", "", ""])?;
    wtr.write_record(["Type", analysis.kind.as_str(), ""])?;
    wtr.write_record(["Tracks Analyzed", tracks.as_str(), ""])?;
    wtr.write_record(["Generated", generated.as_str(), ""])?;
    wtr.write_record(blank)?;

    wtr.write_record(["Attribute", "Average", "Min", "Max"])?;
    for (attr, stats) in &analysis.attributes {
        wtr.write_record([
            attr.to_string(),
            format!("{:.3}", stats.average),
            format!("{:.3}", stats.min),
            format!("{:.3}", stats.max),
        ])?;
    }
    wtr.write_record(blank)?;

    let sections: [(&str, &str, &[RankedCount]); 4] = [
        ("Top Genres", "Genre", &analysis.top_genres),
        ("Top Artists", "Artist", &analysis.top_artists),
        ("Top Albums", "Album", &analysis.top_albums),
        ("Top Years", "Year", &analysis.top_years),
    ];
    for (title, column, rows) in sections {
        wtr.write_record([title, "", ""])?;
        wtr.write_record(["Rank", column, "Count"])?;
        for (i, row) in rows.iter().enumerate() {
            wtr.write_record([(i + 1).to_string(), row.name.clone(), row.count.to_string()])?;
        }
        wtr.write_record(blank)?;
    }

    wtr.flush()?;
    info!(path = %path.display(), "exported taste analysis");
    Ok(path)
}
