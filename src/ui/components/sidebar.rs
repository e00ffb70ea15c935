use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::truncate_str;
use crate::app::state::{ActiveScreen, AppState};
use crate::ui::theme::*;

const NAV_ITEMS: &[(&str, &str, ActiveScreen)] = &[
    ("1", "❤  Liked Songs", ActiveScreen::Library),
    ("2", "󰍉  Search",      ActiveScreen::Search),
    ("3", "📋  Playlists",   ActiveScreen::Playlists),
    ("4", "✦  Insights",    ActiveScreen::Insights),
];

pub fn render_sidebar(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(Span::styled(" ♫ likeshelf ", title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(false))
        .style(normal_style());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // account
            Constraint::Length(5), // nav items
            Constraint::Length(1), // separator
            Constraint::Min(0),    // library summary
            Constraint::Length(2), // volume
        ])
        .split(inner);

    render_account(f, chunks[0], state);

    // ── Nav items ──────────────────────────────────────
    let items: Vec<ListItem> = NAV_ITEMS
        .iter()
        .map(|(key, label, screen)| {
            let is_active = state.active_screen == *screen;
            let prefix = if is_active { " ▶ " } else { "   " };
            let style = if is_active {
                Style::default().fg(BG).bg(PRIMARY).add_modifier(Modifier::BOLD)
            } else {
                normal_style()
            };
            let line = Line::from(vec![
                Span::styled(prefix, if is_active { Style::default().fg(BG).bg(PRIMARY) } else { muted_style() }),
                Span::styled(format!("[{key}] {label}"), style),
                Span::styled(" ".repeat(area.width.saturating_sub(20) as usize), style),
            ]);
            ListItem::new(line)
        })
        .collect();
    f.render_widget(List::new(items), chunks[1]);

    let sep_width = chunks[2].width.saturating_sub(4) as usize;
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("  {}", "─".repeat(sep_width)),
            muted_style(),
        ))),
        chunks[2],
    );

    render_summary(f, chunks[3], state);
    render_volume(f, chunks[4], state);
}

fn render_account(f: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width.saturating_sub(4) as usize;
    let line = match &state.session {
        Some(session) => Line::from(vec![
            Span::styled(" ● ", playing_style()),
            Span::styled(truncate_str(session.user.label(), width), normal_style()),
        ]),
        None if state.is_logging_in => Line::from(vec![
            Span::styled(" ◌ ", highlight_style()),
            Span::styled("logging in...", dim_style()),
        ]),
        None => Line::from(vec![
            Span::styled(" ○ ", error_style()),
            Span::styled("offline · L to log in", dim_style()),
        ]),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_summary(f: &mut Frame, area: Rect, state: &AppState) {
    if area.height < 2 {
        return;
    }
    let lib = &state.library;
    let mut lines = vec![
        Line::from(Span::styled("  Library", accent_style())),
        Line::from(Span::styled(format!("    {} liked songs", lib.entries.len()), dim_style())),
        Line::from(Span::styled(
            format!("    {} playlists", state.playlists.playlists.len()),
            dim_style(),
        )),
    ];
    if let Some(analysis) = &state.insights.analysis {
        if let Some(genre) = analysis.top_genres.first() {
            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled("  Top genre", accent_style())));
            lines.push(Line::from(Span::styled(format!("    {}", genre.name), gold_style())));
        }
    }
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_volume(f: &mut Frame, area: Rect, state: &AppState) {
    let vol = state.volume;
    let bar_width = area.width.saturating_sub(12) as usize;
    let filled = ((vol as f64 / 100.0) * bar_width as f64).round() as usize;
    let empty = bar_width.saturating_sub(filled);

    let vol_line = Line::from(vec![
        Span::styled(" 🔊 ", accent_style()),
        Span::styled("█".repeat(filled), playing_style()),
        Span::styled("░".repeat(empty), muted_style()),
        Span::styled(format!(" {:3}%", vol), dim_style()),
    ]);
    f.render_widget(Paragraph::new(vec![Line::from(Span::raw("")), vol_line]), area);
}
