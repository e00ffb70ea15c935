use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use super::make_block;
use crate::app::state::AppState;
use crate::library::model::format_duration;
use crate::ui::theme::*;

pub fn render_playlists(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_playlist_list(f, chunks[0], state);
    render_playlist_tracks(f, chunks[1], state);
}

fn render_playlist_list(f: &mut Frame, area: Rect, state: &AppState) {
    let pl = &state.playlists;
    if pl.is_loading && pl.playlists.is_empty() {
        let para = Paragraph::new(Line::from(Span::styled("  ⠋ Loading playlists...", dim_style())))
            .block(make_block(" 📋 Playlists ", true));
        f.render_widget(para, area);
        return;
    }

    let selected = pl.selected_playlist;
    let items: Vec<ListItem> = pl
        .playlists
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let is_sel = i == selected;
            let icon = if is_sel { "▶" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{icon} "), if is_sel { playing_style() } else { muted_style() }),
                Span::styled(summary.name.clone(), if is_sel { selected_style() } else { normal_style() }),
                Span::styled(format!("  {}", summary.total_tracks), muted_style()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(make_block(
            &format!(" 📋 Playlists ({}) ", pl.playlists.len()),
            !pl.viewing_tracks,
        ))
        .highlight_style(selected_style());

    let mut list_state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_playlist_tracks(f: &mut Frame, area: Rect, state: &AppState) {
    let pl = &state.playlists;
    let playlist_name = pl
        .current()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Playlist".to_string());

    if !pl.viewing_tracks || pl.tracks.is_empty() {
        let msg = if pl.viewing_tracks && pl.is_loading {
            "  ⠋ Loading tracks..."
        } else if pl.viewing_tracks {
            "  This playlist has no playable tracks."
        } else {
            "  Select a playlist to see its tracks (Enter)"
        };
        let para = Paragraph::new(Line::from(Span::styled(msg, muted_style())))
            .block(make_block(&format!(" 🎵 {playlist_name} "), false));
        f.render_widget(para, area);
        return;
    }

    let selected = pl.selected_track;
    let rows: Vec<Row> = pl
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_sel = i == selected;
            let num = if is_sel { "▶".to_string() } else { format!("{}", i + 1) };
            Row::new(vec![
                Cell::from(num).style(if is_sel { playing_style() } else { muted_style() }),
                Cell::from(track.name.clone()).style(if is_sel { selected_style() } else { normal_style() }),
                Cell::from(track.artists_joined()).style(dim_style()),
                Cell::from(format_duration(track.duration_ms)).style(muted_style()),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("#").style(header_style()),
        Cell::from("Title").style(header_style()),
        Cell::from("Artist").style(header_style()),
        Cell::from("Dur").style(header_style()),
    ]);

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Percentage(40),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(make_block(
        &format!(" 🎵 {playlist_name}  i analyse · c copy "),
        true,
    ))
    .row_highlight_style(selected_style());

    let mut table_state = TableState::default().with_selected(Some(selected));
    f.render_stateful_widget(table, area, &mut table_state);
}
