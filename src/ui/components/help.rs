use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::ui::theme::*;

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(64, 80, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" ❓ Keybindings ", title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(border_style(true))
        .style(normal_style().bg(BG_ALT));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(inner);

    let left = vec![
        heading("Navigation"),
        Line::from(Span::raw("")),
        key_line("↑ / k", "Move up"),
        key_line("↓ / j", "Move down"),
        key_line("Enter", "Play / open"),
        key_line("Esc / b", "Back"),
        key_line("1-4", "Switch screen"),
        Line::from(Span::raw("")),
        heading("Playback"),
        Line::from(Span::raw("")),
        key_line("Space", "Pause / Resume"),
        key_line("n", "Next track"),
        key_line("p", "Previous track"),
        key_line("+ / =", "Volume up"),
        key_line("-", "Volume down"),
        Line::from(Span::raw("")),
        key_line("L", "Log in to Spotify"),
        key_line("?", "Toggle this help"),
        key_line("q", "Quit"),
    ];

    let right = vec![
        heading("Liked Songs"),
        Line::from(Span::raw("")),
        key_line("r", "Refresh from Spotify"),
        key_line("/", "Filter list"),
        key_line("x", "Export CSV"),
        key_line("c", "Copy into a playlist"),
        key_line("i", "Analyse taste"),
        key_line("D", "Prune old snapshots"),
        Line::from(Span::raw("")),
        heading("Search & Playlists"),
        Line::from(Span::raw("")),
        key_line("s", "Open search"),
        key_line("l", "Like search result"),
        key_line("→ / Enter", "Open playlist"),
        key_line("i", "Analyse results / playlist"),
        Line::from(Span::raw("")),
        heading("Insights"),
        Line::from(Span::raw("")),
        key_line("x", "Export analysis CSV"),
    ];

    f.render_widget(Paragraph::new(left), cols[0]);
    f.render_widget(Paragraph::new(right), cols[1]);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {text}"),
        highlight_style().add_modifier(Modifier::BOLD),
    ))
}

fn key_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", muted_style()),
        Span::styled(format!("{key:<10}"), accent_style()),
        Span::styled(desc.to_string(), normal_style()),
    ])
}
