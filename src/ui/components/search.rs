use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::make_block;
use crate::app::state::AppState;
use crate::library::model::format_duration;
use crate::ui::theme::*;

pub fn render_search(f: &mut Frame, area: Rect, state: &AppState) {
    let search = &state.search;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // results
        ])
        .split(area);

    // ── Search input box ──────────────────────────────────────────────────
    let cursor = if search.is_editing && (state.ticker_tick / 5) % 2 == 0 { "│" } else { "" };
    let input_block = Block::default()
        .title(Span::styled(" 󰍉 Search Spotify ", title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(search.is_editing))
        .style(normal_style().bg(BG_ALT));

    let input_text = Paragraph::new(Line::from(vec![
        Span::styled(" ", muted_style()),
        Span::styled(search.query.clone(), accent_style()),
        Span::styled(cursor, highlight_style()),
    ]))
    .block(input_block);
    f.render_widget(input_text, chunks[0]);

    // ── Results ───────────────────────────────────────────────────────────
    if search.tracks.is_empty() {
        let placeholder = if search.is_loading {
            "  ⠋ Searching..."
        } else if search.query.is_empty() {
            "  Press [s] to search, type a query, then Enter..."
        } else {
            "  No results found."
        };
        let para = Paragraph::new(Line::from(Span::styled(placeholder, muted_style())))
            .block(make_block(" Results ", false));
        f.render_widget(para, chunks[1]);
        return;
    }

    let selected = search.selected;
    let items: Vec<ListItem> = search
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_sel = i == selected;
            let lead = if is_sel {
                Span::styled("▶    ", playing_style())
            } else {
                Span::styled(format!("{:>3}. ", i + 1), muted_style())
            };
            let line = Line::from(vec![
                lead,
                Span::styled(track.name.clone(), if is_sel { selected_style() } else { normal_style() }),
                Span::styled(" — ", muted_style()),
                Span::styled(track.artists_joined(), dim_style()),
                Span::styled(
                    format!("  {}  {}", track.album, format_duration(track.duration_ms)),
                    muted_style(),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(make_block(
            &format!(" Results ({})  Enter play · l like ", search.tracks.len()),
            !search.is_editing,
        ))
        .highlight_style(selected_style());

    let mut list_state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}
