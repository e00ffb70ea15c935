use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::{make_block, truncate_str};
use crate::app::state::AppState;
use crate::library::model::format_duration;
use crate::ui::theme::*;

pub fn render_library(f: &mut Frame, area: Rect, state: &AppState) {
    let lib = &state.library;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_status_line(f, chunks[1], state);

    if lib.is_loading {
        let msg = if lib.fetched_so_far > 0 {
            format!("  ⠋ Fetched {} liked songs so far...", lib.fetched_so_far)
        } else {
            "  ⠋ Loading liked songs...".to_string()
        };
        let para = Paragraph::new(Line::from(Span::styled(msg, dim_style())))
            .block(make_block(" ❤  Liked Songs ", true));
        f.render_widget(para, chunks[0]);
        return;
    }

    let visible = lib.visible();
    if visible.is_empty() {
        let msg = if !state.is_authenticated() {
            "  Log in with L to load your liked songs."
        } else if lib.entries.is_empty() {
            "  No liked songs yet. Open Spotify and like some tracks!"
        } else {
            "  Nothing matches the filter."
        };
        let para = Paragraph::new(Line::from(Span::styled(msg, muted_style())))
            .block(make_block(" ❤  Liked Songs ", false));
        f.render_widget(para, chunks[0]);
        return;
    }

    let selected = lib.selected;
    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let track = &entry.track;
            let is_sel = i == selected;
            let num = if is_sel { "▶".to_string() } else { format!("{:>4}", i + 1) };
            let style = if is_sel { selected_style() } else { normal_style() };
            Row::new(vec![
                Cell::from(num).style(if is_sel { playing_style() } else { muted_style() }),
                Cell::from(track.name.clone()).style(style),
                Cell::from(track.artists_joined()).style(dim_style()),
                Cell::from(track.album.clone()).style(muted_style()),
                Cell::from(format_duration(track.duration_ms)).style(muted_style()),
                Cell::from(entry.added_at.format("%Y-%m-%d").to_string()).style(muted_style()),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("  # ").style(header_style()),
        Cell::from("Title").style(header_style()),
        Cell::from("Artist").style(header_style()),
        Cell::from("Album").style(header_style()),
        Cell::from("Dur").style(header_style()),
        Cell::from("Liked").style(header_style()),
    ])
    .height(1);

    let title = if lib.filter.is_empty() {
        format!(" ❤  Liked Songs ({}) ", lib.entries.len())
    } else {
        format!(" ❤  Liked Songs ({} of {}) ", visible.len(), lib.entries.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Percentage(25),
            Constraint::Length(6),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(make_block(&title, true))
    .row_highlight_style(selected_style());

    let mut table_state = TableState::default().with_selected(Some(selected));
    f.render_stateful_widget(table, chunks[0], &mut table_state);
}

fn render_status_line(f: &mut Frame, area: Rect, state: &AppState) {
    let lib = &state.library;
    let line = if lib.filtering {
        Line::from(vec![
            Span::styled(" / ", highlight_style()),
            Span::styled(lib.filter.clone(), normal_style()),
            Span::styled("█", accent_style()),
        ])
    } else {
        let mut spans = Vec::new();
        if !lib.filter.is_empty() {
            spans.push(Span::styled(format!(" filter: {} ", lib.filter), highlight_style()));
        }
        let note = lib
            .provenance
            .clone()
            .unwrap_or_else(|| "No liked songs loaded".to_string());
        let room = (area.width as usize).saturating_sub(2);
        spans.push(Span::styled(format!(" {}", truncate_str(&note, room)), dim_style()));
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), area);
}
