use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::state::AppState;
use crate::ui::theme::*;

pub fn render_player_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(true))
        .style(normal_style());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35), // track info
            Constraint::Percentage(40), // progress
            Constraint::Percentage(25), // controls
        ])
        .split(inner);

    render_track_info(f, chunks[0], state);

    // ── Progress ───────────────────────────────────────────────────
    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // gauge
            Constraint::Min(0),    // time label
        ])
        .split(chunks[1]);

    let np = &state.now_playing;
    let gauge = Gauge::default()
        .gauge_style(ratatui::style::Style::default().fg(PRIMARY).bg(SURFACE))
        .percent((np.progress_percent() * 100.0) as u16)
        .label("");
    f.render_widget(gauge, center[0]);

    let time_label = Paragraph::new(Line::from(Span::styled(
        np.progress_formatted(),
        dim_style(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(time_label, center[1]);

    // ── Controls ───────────────────────────────────────────────────
    let controls = Paragraph::new(vec![
        Line::from(Span::styled("⏮ p  ⏯ spc  ⏭ n", dim_style())),
        Line::from(Span::styled(format!("vol {}%  +/-   ? help", state.volume), muted_style())),
    ])
    .alignment(Alignment::Right);
    f.render_widget(controls, chunks[2]);
}

fn render_track_info(f: &mut Frame, area: Rect, state: &AppState) {
    let np = &state.now_playing;
    if np.name.is_empty() {
        let idle = if state.is_authenticated() {
            "Nothing playing"
        } else {
            "Not connected"
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(idle, muted_style()))),
            area,
        );
        return;
    }

    let play_icon = if np.is_playing { "▶" } else { "⏸" };
    let title = state.get_display_title(area.width.saturating_sub(3) as usize);
    let artist = np.artists.join(", ");

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{play_icon} "), playing_style()),
            Span::styled(title, normal_style().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            if artist.is_empty() { "—".to_string() } else { artist },
            dim_style(),
        )),
    ];
    if area.height >= 3 && !np.album.is_empty() {
        lines.push(Line::from(Span::styled(format!("💿 {}", np.album), muted_style())));
    }

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Left), area);
}
