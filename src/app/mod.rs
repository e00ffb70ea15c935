pub mod state;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use std::time::Duration;
use tokio::{sync::mpsc, time};
use tracing::{info, warn};

use crate::{
    app::state::{ActiveScreen, AppState, Notification, NowPlaying, Session},
    config::Config,
    error::AuthError,
    events::{map_key_to_action, map_login_key, UserAction},
    library::{
        self,
        analysis::{self, TasteAnalysis},
        export, LoadOutcome, SnapshotStore, TrackRecord,
    },
    spotify::{
        build_spotify_client, complete_auth, current_user,
        library::{Library, PlaylistSummary},
        player::Player,
        search::Search,
        taste::Taste,
    },
};

const TICK_MS: u64 = 100;
const POLL_MS: u64 = 2000;
const SEARCH_LIMIT: u32 = 50;
/// Tracks sent to the taste analysis per run.
const ANALYSIS_LIMIT: usize = 100;
/// Tracks queued when playing from a row.
const PLAY_AHEAD: usize = 50;
const SNAPSHOTS_KEPT: usize = 5;

/// Results of background work, delivered back to the event loop.
pub enum AppEvent {
    Playback(NowPlaying),
    LibraryProgress(usize),
    LibraryLoaded(Result<LoadOutcome, String>),
    SearchResults(Result<Vec<TrackRecord>, String>),
    PlaylistsLoaded(Result<Vec<PlaylistSummary>, String>),
    PlaylistTracks(Result<Vec<TrackRecord>, String>),
    AnalysisReady(TasteAnalysis),
    Notify(Notification),
}

pub struct App {
    pub state: AppState,
    config: Config,
    store: SnapshotStore,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
    poller: Option<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let store = SnapshotStore::new(config.cache_dir());
        App {
            state: AppState::default(),
            config,
            store,
            tx,
            rx,
            poller: None,
        }
    }

    pub async fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        self.login(terminal, &mut event_stream).await;

        // ── Main event loop ───────────────────────────────────────────────────
        let mut tick_interval = time::interval(Duration::from_millis(TICK_MS));

        loop {
            terminal.draw(|f| crate::ui::render(f, &self.state))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.state.tick_ticker();
                    self.state.tick_notification();
                    let np = &mut self.state.now_playing;
                    if np.is_playing {
                        np.progress_ms = (np.progress_ms + TICK_MS as u32).min(np.duration_ms);
                    }
                }
                Some(event) = self.rx.recv() => {
                    self.apply_event(event);
                }
                maybe_event = event_stream.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_event {
                        if let Some(action) = map_key_to_action(key, self.state.is_editing()) {
                            if action == UserAction::Login {
                                self.login(terminal, &mut event_stream).await;
                            } else {
                                self.handle_action(action);
                            }
                        }
                    }
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        Ok(())
    }

    // ── Session ───────────────────────────────────────────────────────────────

    /// Runs the browser login when needed. Failures leave the app usable but
    /// unauthenticated; `L` retries. Esc abandons the wait for the redirect.
    async fn login<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
        events: &mut EventStream,
    ) {
        if self.state.is_authenticated() {
            self.state.set_notification(Notification::info("Already connected"));
            return;
        }
        match self.authenticate(terminal, events).await {
            Ok(session) => {
                info!(user = %session.user.label(), "Authenticated successfully");
                self.state.set_notification(Notification::info(format!(
                    "Connected as {}",
                    session.user.label()
                )));
                self.state.session = Some(session);
                self.start_poller();
                self.load_library(false);
            }
            Err(e) if matches!(e.downcast_ref::<AuthError>(), Some(AuthError::Cancelled)) => {
                info!("Login cancelled");
                self.state
                    .set_notification(Notification::info("Login cancelled. Press L to retry"));
            }
            Err(e) => {
                warn!("Login failed: {e:#}");
                self.state.set_notification(Notification::error(format!(
                    "Login failed: {e}. Press L to retry"
                )));
            }
        }
        self.state.auth_url = None;
        self.state.is_logging_in = false;
    }

    async fn authenticate<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
        events: &mut EventStream,
    ) -> Result<Session> {
        let (spotify, auth_url) = build_spotify_client(&self.config).await?;

        if let Some(url) = auth_url {
            if let Err(e) = open::that(&url) {
                warn!("Could not open browser: {e}");
            }
            self.state.auth_url = Some(url);
            self.state.is_logging_in = true;
            terminal.draw(|f| crate::ui::render(f, &self.state))?;

            let interrupted = tokio::select! {
                done = complete_auth(&spotify, &self.config) => {
                    done?;
                    None
                }
                action = wait_for_login_key(events) => Some(action),
            };
            if let Some(action) = interrupted {
                if action == UserAction::Quit {
                    self.state.should_quit = true;
                }
                return Err(AuthError::Cancelled.into());
            }
        }

        let user = current_user(&spotify).await?;
        Ok(Session { spotify, user })
    }

    /// Clone of the live session, or a notification when not logged in.
    fn session(&mut self) -> Option<Session> {
        if self.state.session.is_none() {
            self.state
                .set_notification(Notification::error("Not connected to Spotify. Press L to log in"));
        }
        self.state.session.clone()
    }

    /// Background playback poll; sleeps between polls so slow calls never overlap.
    fn start_poller(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        let tx = self.tx.clone();
        self.poller = Some(tokio::spawn(async move {
            let player = Player::new(session.spotify);
            loop {
                match player.get_current_playback().await {
                    Ok(Some(np)) => {
                        if tx.send(AppEvent::Playback(np)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Playback poll error: {e}"),
                }
                time::sleep(Duration::from_millis(POLL_MS)).await;
            }
        }));
    }

    // ── Background results ────────────────────────────────────────────────────

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Playback(np) => {
                if let Some(vol) = np.device_volume {
                    self.state.volume = vol;
                }
                if np.name != self.state.now_playing.name {
                    self.state.ticker_offset = 0;
                }
                self.state.now_playing = np;
            }
            AppEvent::LibraryProgress(n) => {
                self.state.library.fetched_so_far = n;
            }
            AppEvent::LibraryLoaded(result) => {
                self.state.library.is_loading = false;
                match result {
                    Ok(outcome) => {
                        let note = outcome.provenance_note();
                        info!(from_cache = outcome.from_cache(), "{note}");
                        self.state.library.entries = outcome.entries;
                        self.state.library.selected = 0;
                        self.state.library.provenance = Some(note.clone());
                        self.state.set_notification(Notification::info(note));
                    }
                    Err(e) => {
                        self.state
                            .set_notification(Notification::error(format!("Loading liked songs failed: {e}")));
                    }
                }
            }
            AppEvent::SearchResults(result) => {
                self.state.search.is_loading = false;
                match result {
                    Ok(tracks) => {
                        self.state.set_notification(Notification::info(format!(
                            "Found {} tracks",
                            tracks.len()
                        )));
                        self.state.search.tracks = tracks;
                        self.state.search.selected = 0;
                    }
                    Err(e) => self
                        .state
                        .set_notification(Notification::error(format!("Search failed: {e}"))),
                }
            }
            AppEvent::PlaylistsLoaded(result) => {
                self.state.playlists.is_loading = false;
                match result {
                    Ok(playlists) => self.state.playlists.playlists = playlists,
                    Err(e) => self
                        .state
                        .set_notification(Notification::error(format!("Loading playlists failed: {e}"))),
                }
            }
            AppEvent::PlaylistTracks(result) => {
                self.state.playlists.is_loading = false;
                match result {
                    Ok(tracks) => {
                        self.state.playlists.tracks = tracks;
                        self.state.playlists.selected_track = 0;
                    }
                    Err(e) => self
                        .state
                        .set_notification(Notification::error(format!("Loading playlist failed: {e}"))),
                }
            }
            AppEvent::AnalysisReady(result) => {
                self.state.insights.is_loading = false;
                let msg = if result.skipped_batches > 0 {
                    format!(
                        "Analysed {} tracks ({} batches unavailable)",
                        result.tracks_analyzed, result.skipped_batches
                    )
                } else {
                    format!("Analysed {} tracks", result.tracks_analyzed)
                };
                self.state.set_notification(Notification::info(msg));
                self.state.insights.analysis = Some(result);
                self.state.insights.scroll = 0;
                self.state.navigate_to(ActiveScreen::Insights);
            }
            AppEvent::Notify(n) => self.state.set_notification(n),
        }
        self.state.clamp_selections();
    }

    // ── Action handler ────────────────────────────────────────────────────────

    fn handle_action(&mut self, action: UserAction) {
        match action {
            UserAction::Quit => self.state.should_quit = true,
            UserAction::ToggleHelp => self.state.show_help = !self.state.show_help,
            UserAction::Login => {}
            UserAction::SwitchScreen(n) => {
                self.state.show_help = false;
                match n {
                    1 => self.state.navigate_to(ActiveScreen::Library),
                    2 => self.state.navigate_to(ActiveScreen::Search),
                    3 => {
                        self.state.navigate_to(ActiveScreen::Playlists);
                        if self.state.playlists.playlists.is_empty() {
                            self.load_playlists();
                        }
                    }
                    4 => self.state.navigate_to(ActiveScreen::Insights),
                    _ => {}
                }
            }
            UserAction::OpenSearch => {
                self.state.navigate_to(ActiveScreen::Search);
                self.state.search.is_editing = true;
            }
            UserAction::OpenFilter => {
                if self.state.active_screen == ActiveScreen::Library {
                    self.state.library.filtering = true;
                }
            }
            UserAction::Back => {
                if self.state.search.is_editing {
                    self.state.search.is_editing = false;
                } else if self.state.library.filtering {
                    self.state.library.filtering = false;
                    self.state.library.filter.clear();
                    self.state.clamp_selections();
                } else if self.state.show_help {
                    self.state.show_help = false;
                } else if self.state.playlists.viewing_tracks
                    && self.state.active_screen == ActiveScreen::Playlists
                {
                    self.state.playlists.viewing_tracks = false;
                } else if let Some(prev) = self.state.previous_screen.take() {
                    self.state.active_screen = prev;
                }
            }
            UserAction::Input(c) => {
                if self.state.search.is_editing {
                    self.state.search.query.push(c);
                } else if self.state.library.filtering {
                    self.state.library.filter.push(c);
                    self.state.library.selected = 0;
                }
            }
            UserAction::InputBackspace => {
                if self.state.search.is_editing {
                    self.state.search.query.pop();
                } else if self.state.library.filtering {
                    self.state.library.filter.pop();
                    self.state.clamp_selections();
                }
            }
            UserAction::InputSubmit => {
                if self.state.search.is_editing {
                    self.state.search.is_editing = false;
                    if !self.state.search.query.trim().is_empty() {
                        self.do_search();
                    }
                } else {
                    // keep the filter applied, leave input mode
                    self.state.library.filtering = false;
                }
            }
            UserAction::NavigateUp => self.move_selection(-1),
            UserAction::NavigateDown => self.move_selection(1),
            UserAction::NavigateLeft => {
                if self.state.active_screen == ActiveScreen::Playlists {
                    self.state.playlists.viewing_tracks = false;
                }
            }
            UserAction::NavigateRight => {
                if self.state.active_screen == ActiveScreen::Playlists
                    && !self.state.playlists.viewing_tracks
                {
                    self.open_playlist();
                }
            }
            UserAction::Select => self.handle_select(),
            UserAction::Refresh => self.load_library(true),
            UserAction::Export => self.export_current(),
            UserAction::Analyze => self.analyze_current(),
            UserAction::CreatePlaylist => self.create_playlist(),
            UserAction::LikeTrack => self.like_selected(),
            UserAction::PruneCache => self.prune_snapshots(),
            UserAction::TogglePlay => {
                let Some(session) = self.session() else { return };
                let is_playing = self.state.now_playing.is_playing;
                self.state.now_playing.is_playing = !is_playing;
                self.state
                    .set_notification(Notification::info(if is_playing { "Paused" } else { "Resumed" }));
                self.spawn_player(session, move |player| async move {
                    player.toggle_playback(is_playing).await
                });
            }
            UserAction::NextTrack => {
                let Some(session) = self.session() else { return };
                self.state.set_notification(Notification::info("Next track ▶▶"));
                self.state.now_playing.progress_ms = 0;
                self.spawn_player(session, |player| async move { player.next_track().await });
            }
            UserAction::PrevTrack => {
                let Some(session) = self.session() else { return };
                self.state.set_notification(Notification::info("Previous track ◀◀"));
                self.state.now_playing.progress_ms = 0;
                self.spawn_player(session, |player| async move { player.previous_track().await });
            }
            UserAction::VolumeUp | UserAction::VolumeDown => {
                let Some(session) = self.session() else { return };
                let new_vol = if action == UserAction::VolumeUp {
                    (self.state.volume as u16 + 5).min(100) as u8
                } else {
                    self.state.volume.saturating_sub(5)
                };
                self.state.volume = new_vol;
                self.state
                    .set_notification(Notification::info(format!("Volume: {new_vol}%")));
                self.spawn_player(session, move |player| async move {
                    player.set_volume(new_vol).await
                });
            }
        }
    }

    /// Fire-and-forget player command; errors come back as notifications.
    fn spawn_player<F, Fut>(&self, session: Session, f: F)
    where
        F: FnOnce(Player) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Err(e) = f(Player::new(session.spotify)).await {
                warn!("Player command failed: {e}");
                let _ = tx.send(AppEvent::Notify(Notification::error(e.to_string()))).await;
            }
        });
    }

    // ── Navigation helpers ────────────────────────────────────────────────────

    fn move_selection(&mut self, delta: isize) {
        let step = |sel: &mut usize, len: usize| {
            let max = len.saturating_sub(1);
            *sel = if delta < 0 {
                sel.saturating_sub(delta.unsigned_abs())
            } else {
                (*sel + delta as usize).min(max)
            };
        };
        match self.state.active_screen {
            ActiveScreen::Library => {
                let len = self.state.library.visible().len();
                step(&mut self.state.library.selected, len);
            }
            ActiveScreen::Search => {
                step(&mut self.state.search.selected, self.state.search.tracks.len());
            }
            ActiveScreen::Playlists => {
                if self.state.playlists.viewing_tracks {
                    step(
                        &mut self.state.playlists.selected_track,
                        self.state.playlists.tracks.len(),
                    );
                } else {
                    step(
                        &mut self.state.playlists.selected_playlist,
                        self.state.playlists.playlists.len(),
                    );
                }
            }
            ActiveScreen::Insights => {
                if delta < 0 {
                    self.state.insights.scroll = self.state.insights.scroll.saturating_sub(1);
                } else {
                    self.state.insights.scroll += 1;
                }
            }
        }
    }

    /// Tracks shown on the current screen, in display order.
    fn displayed_tracks(&self) -> Vec<TrackRecord> {
        match self.state.active_screen {
            ActiveScreen::Library => self.state.library.visible_tracks(),
            ActiveScreen::Search => self.state.search.tracks.clone(),
            ActiveScreen::Playlists if self.state.playlists.viewing_tracks => {
                self.state.playlists.tracks.clone()
            }
            _ => Vec::new(),
        }
    }

    fn selected_index(&self) -> usize {
        match self.state.active_screen {
            ActiveScreen::Library => self.state.library.selected,
            ActiveScreen::Search => self.state.search.selected,
            ActiveScreen::Playlists => self.state.playlists.selected_track,
            ActiveScreen::Insights => 0,
        }
    }

    // ── Select handler ────────────────────────────────────────────────────────

    fn handle_select(&mut self) {
        if self.state.active_screen == ActiveScreen::Playlists && !self.state.playlists.viewing_tracks {
            self.open_playlist();
            return;
        }

        let tracks = self.displayed_tracks();
        let idx = self.selected_index();
        let Some(track) = tracks.get(idx) else { return };
        let Some(session) = self.session() else { return };

        let uris: Vec<String> = tracks[idx..]
            .iter()
            .filter_map(TrackRecord::uri)
            .take(PLAY_AHEAD)
            .collect();
        self.state
            .set_notification(Notification::info(format!("Playing: {}", track.name)));
        self.spawn_player(session, move |player| async move { player.play_tracks(&uris).await });
    }

    // ── Spotify data loaders ──────────────────────────────────────────────────

    fn load_library(&mut self, force_refresh: bool) {
        if self.state.library.is_loading {
            return;
        }
        let Some(session) = self.session() else { return };
        self.state.library.is_loading = true;
        self.state.library.fetched_so_far = 0;

        let store = self.store.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let source = Library::new(session.spotify.clone());
            let progress_tx = tx.clone();
            let result = library::load::load_with_progress(
                &source,
                &store,
                &session.user,
                force_refresh,
                move |n| {
                    let _ = progress_tx.try_send(AppEvent::LibraryProgress(n));
                },
            )
            .await
            .map_err(|e| {
                warn!("Loading liked songs failed: {e:#}");
                e.to_string()
            });
            let _ = tx.send(AppEvent::LibraryLoaded(result)).await;
        });
    }

    fn load_playlists(&mut self) {
        let Some(session) = self.session() else { return };
        self.state.playlists.is_loading = true;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = Library::new(session.spotify)
                .get_user_playlists()
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::PlaylistsLoaded(result)).await;
        });
    }

    fn open_playlist(&mut self) {
        let Some(playlist_id) = self.state.playlists.current().map(|p| p.id.clone()) else {
            return;
        };
        let Some(session) = self.session() else { return };
        self.state.playlists.viewing_tracks = true;
        self.state.playlists.selected_track = 0;
        self.state.playlists.tracks.clear();
        self.state.playlists.is_loading = true;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = Library::new(session.spotify)
                .get_playlist_tracks(&playlist_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::PlaylistTracks(result)).await;
        });
    }

    fn do_search(&mut self) {
        let Some(session) = self.session() else { return };
        let query = self.state.search.query.trim().to_string();
        self.state.search.is_loading = true;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = Search::new(session.spotify)
                .search_tracks(&query, SEARCH_LIMIT)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::SearchResults(result)).await;
        });
    }

    // ── Library actions ───────────────────────────────────────────────────────

    fn export_current(&mut self) {
        if self.state.active_screen == ActiveScreen::Insights {
            let Some(analysis) = self.state.insights.analysis.as_ref() else {
                self.state
                    .set_notification(Notification::error("Nothing to export yet, press i on a list first"));
                return;
            };
            let note = match analysis::export_analysis(analysis, &self.config.export_dir()) {
                Ok(path) => Notification::info(format!("Analysis exported to {}", path.display())),
                Err(e) => Notification::error(format!("Export failed: {e}")),
            };
            self.state.set_notification(note);
            return;
        }

        if self.state.library.entries.is_empty() {
            self.state
                .set_notification(Notification::error("No liked songs loaded"));
            return;
        }
        let path = self.config.export_dir().join(export::EXPORT_FILE_NAME);
        let visible: Vec<_> = self.state.library.visible().into_iter().cloned().collect();
        let note = match export::export(&visible, &path) {
            Ok(()) => {
                info!(path = %path.display(), count = visible.len(), "exported liked songs");
                Notification::info(format!("Exported {} songs to {}", visible.len(), path.display()))
            }
            Err(e) => {
                warn!("Export failed: {e}");
                Notification::error(format!("Export failed: {e}"))
            }
        };
        self.state.set_notification(note);
    }

    fn analyze_current(&mut self) {
        let (tracks, kind) = match self.state.active_screen {
            ActiveScreen::Library => (self.state.library.visible_tracks(), "liked"),
            ActiveScreen::Playlists if self.state.playlists.viewing_tracks => {
                (self.state.playlists.tracks.clone(), "playlist")
            }
            ActiveScreen::Search => (self.state.search.tracks.clone(), "search"),
            _ => {
                self.state
                    .set_notification(Notification::error("Open a track list to analyse"));
                return;
            }
        };
        if tracks.is_empty() {
            self.state.set_notification(Notification::error("No tracks to analyse"));
            return;
        }
        if self.state.insights.is_loading {
            return;
        }
        let Some(session) = self.session() else { return };
        self.state.insights.is_loading = true;
        self.state
            .set_notification(Notification::info("Analysing your taste..."));

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let source = Taste::new(session.spotify);
            let result = analysis::analyze(&source, &tracks, ANALYSIS_LIMIT, kind).await;
            let _ = tx.send(AppEvent::AnalysisReady(result)).await;
        });
    }

    fn create_playlist(&mut self) {
        let tracks = self.displayed_tracks();
        if tracks.is_empty() {
            self.state
                .set_notification(Notification::error("No tracks to put in a playlist"));
            return;
        }
        let Some(session) = self.session() else { return };
        let now = Local::now();
        let name = format!("Liked Songs {}", now.format("%Y-%m-%d"));
        let description = format!(
            "{} tracks saved on {}",
            tracks.len(),
            now.format("%Y-%m-%d %H:%M")
        );
        self.state
            .set_notification(Notification::info(format!("Creating playlist \"{name}\"...")));

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let lib = Library::new(session.spotify);
            let note = match lib.create_playlist(&session.user, &name, &description, &tracks).await {
                Ok(_) => Notification::info(format!("Created \"{name}\" with {} tracks", tracks.len())),
                Err(e) => {
                    warn!("Playlist creation failed: {e}");
                    Notification::error(format!("Creating playlist failed: {e}"))
                }
            };
            let _ = tx.send(AppEvent::Notify(note)).await;
        });
    }

    fn like_selected(&mut self) {
        if self.state.active_screen != ActiveScreen::Search {
            return;
        }
        let Some(track) = self.state.search.tracks.get(self.state.search.selected).cloned() else {
            return;
        };
        let Some(session) = self.session() else { return };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let note = match Library::new(session.spotify).save_track(&track.id).await {
                Ok(()) => Notification::info(format!("❤ Added \"{}\" to Liked Songs", track.name)),
                Err(e) => Notification::error(format!("Could not like track: {e}")),
            };
            let _ = tx.send(AppEvent::Notify(note)).await;
        });
    }

    fn prune_snapshots(&mut self) {
        let Some(session) = self.state.session.as_ref() else {
            self.state
                .set_notification(Notification::error("Not connected to Spotify. Press L to log in"));
            return;
        };
        let note = match self.store.prune(&session.user.user_key(), SNAPSHOTS_KEPT) {
            Ok(0) => Notification::info("No old snapshots to remove"),
            Ok(n) => Notification::info(format!(
                "Removed {n} old snapshots from {}",
                self.store.dir().display()
            )),
            Err(e) => Notification::error(format!("Pruning snapshots failed: {e}")),
        };
        self.state.set_notification(note);
    }
}

/// Resolves with the first cancelling key pressed during login. A closed
/// event stream never resolves, leaving the redirect wait in charge.
async fn wait_for_login_key(events: &mut EventStream) -> UserAction {
    while let Some(event) = events.next().await {
        if let Ok(Event::Key(key)) = event {
            if let Some(action) = map_login_key(key) {
                return action;
            }
        }
    }
    futures::future::pending().await
}
