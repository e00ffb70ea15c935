use unicode_width::UnicodeWidthChar;

use crate::{
    library::{analysis::TasteAnalysis, LikedEntry, TrackRecord, UserProfile},
    spotify::{library::PlaylistSummary, SpotifyHandle},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ActiveScreen {
    #[default]
    Library,
    Search,
    Playlists,
    Insights,
}

#[derive(Debug, Clone, Default)]
pub struct NowPlaying {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u32,
    pub progress_ms: u32,
    pub is_playing: bool,
    pub device_volume: Option<u8>,
}

impl NowPlaying {
    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.progress_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn progress_formatted(&self) -> String {
        let secs = self.progress_ms / 1000;
        let dur_secs = self.duration_ms / 1000;
        format!(
            "{}:{:02} / {}:{:02}",
            secs / 60,
            secs % 60,
            dur_secs / 60,
            dur_secs % 60
        )
    }
}

/// Authenticated client plus the profile it belongs to.
#[derive(Clone)]
pub struct Session {
    pub spotify: SpotifyHandle,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub entries: Vec<LikedEntry>,
    pub filter: String,
    pub filtering: bool,
    pub selected: usize,
    pub is_loading: bool,
    pub fetched_so_far: usize,
    pub provenance: Option<String>,
}

impl LibraryState {
    /// Entries passing the current filter, in list order.
    pub fn visible(&self) -> Vec<&LikedEntry> {
        self.entries
            .iter()
            .filter(|e| e.track.matches(&self.filter))
            .collect()
    }

    pub fn visible_tracks(&self) -> Vec<TrackRecord> {
        self.visible().into_iter().map(|e| e.track.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub tracks: Vec<TrackRecord>,
    pub selected: usize,
    pub is_editing: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistsState {
    pub playlists: Vec<PlaylistSummary>,
    pub selected_playlist: usize,
    pub tracks: Vec<TrackRecord>,
    pub selected_track: usize,
    pub viewing_tracks: bool,
    pub is_loading: bool,
}

impl PlaylistsState {
    pub fn current(&self) -> Option<&PlaylistSummary> {
        self.playlists.get(self.selected_playlist)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsightsState {
    pub analysis: Option<TasteAnalysis>,
    pub is_loading: bool,
    pub scroll: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub message: String,
    pub remaining_ticks: u8,
    pub is_error: bool,
}

impl Notification {
    pub fn info(msg: impl Into<String>) -> Self {
        Notification { message: msg.into(), remaining_ticks: 30, is_error: false }
    }
    pub fn error(msg: impl Into<String>) -> Self {
        Notification { message: msg.into(), remaining_ticks: 60, is_error: true }
    }
}

pub struct AppState {
    pub active_screen: ActiveScreen,
    pub previous_screen: Option<ActiveScreen>,
    pub now_playing: NowPlaying,
    pub volume: u8,
    pub library: LibraryState,
    pub search: SearchState,
    pub playlists: PlaylistsState,
    pub insights: InsightsState,
    pub notification: Option<Notification>,
    pub show_help: bool,
    pub should_quit: bool,
    pub ticker_offset: usize,
    pub ticker_tick: u64,
    pub session: Option<Session>,
    pub auth_url: Option<String>,
    pub is_logging_in: bool,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            active_screen: ActiveScreen::Library,
            previous_screen: None,
            now_playing: NowPlaying::default(),
            volume: 50,
            library: LibraryState::default(),
            search: SearchState::default(),
            playlists: PlaylistsState::default(),
            insights: InsightsState::default(),
            notification: None,
            show_help: false,
            should_quit: false,
            ticker_offset: 0,
            ticker_tick: 0,
            session: None,
            auth_url: None,
            is_logging_in: false,
        }
    }
}

impl AppState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// True while keystrokes go to a text field instead of commands.
    pub fn is_editing(&self) -> bool {
        self.search.is_editing || self.library.filtering
    }

    pub fn navigate_to(&mut self, screen: ActiveScreen) {
        if self.active_screen != screen {
            self.previous_screen = Some(self.active_screen);
            self.active_screen = screen;
        }
    }

    pub fn set_notification(&mut self, n: Notification) {
        self.notification = Some(n);
    }

    pub fn tick_notification(&mut self) {
        if let Some(ref mut n) = self.notification {
            if n.remaining_ticks > 0 {
                n.remaining_ticks -= 1;
            } else {
                self.notification = None;
            }
        }
    }

    pub fn tick_ticker(&mut self) {
        self.ticker_tick += 1;
        if self.ticker_tick % 5 == 0 {
            let len = self.now_playing.name.chars().count().max(1);
            self.ticker_offset = (self.ticker_offset + 1) % len;
        }
    }

    /// Now-playing title, scrolled like a ticker when wider than `max_width` columns.
    pub fn get_display_title(&self, max_width: usize) -> String {
        let title = &self.now_playing.name;
        if unicode_width::UnicodeWidthStr::width(title.as_str()) <= max_width {
            return title.clone();
        }
        let padded = format!("{title}   ");
        let chars: Vec<char> = padded.chars().collect();
        let offset = self.ticker_offset % chars.len();

        let mut width = 0;
        let mut visible = String::new();
        for c in chars[offset..].iter().chain(chars[..offset].iter()) {
            let w = c.width().unwrap_or(0);
            if width + w > max_width {
                break;
            }
            width += w;
            visible.push(*c);
        }
        visible
    }

    /// Clamps every list selection after its backing list changed.
    pub fn clamp_selections(&mut self) {
        let clamp = |sel: &mut usize, len: usize| *sel = (*sel).min(len.saturating_sub(1));
        let visible = self.library.visible().len();
        clamp(&mut self.library.selected, visible);
        clamp(&mut self.search.selected, self.search.tracks.len());
        clamp(&mut self.playlists.selected_playlist, self.playlists.playlists.len());
        clamp(&mut self.playlists.selected_track, self.playlists.tracks.len());
    }
}
