pub mod components;
pub mod theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use self::components::{
    centered_rect,
    help::render_help,
    insights::render_insights,
    library::render_library,
    player_bar::render_player_bar,
    playlists::render_playlists,
    search::render_search,
    sidebar::render_sidebar,
    truncate_str,
};
use self::theme::*;
use crate::app::state::{ActiveScreen, AppState};

/// Root render function, called every frame.
pub fn render(f: &mut Frame, state: &AppState) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // sidebar + main
            Constraint::Length(5), // player bar
        ])
        .split(size);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26), // sidebar
            Constraint::Min(0),     // main content
        ])
        .split(main_chunks[0]);

    render_sidebar(f, top_chunks[0], state);

    match state.active_screen {
        ActiveScreen::Library   => render_library(f, top_chunks[1], state),
        ActiveScreen::Search    => render_search(f, top_chunks[1], state),
        ActiveScreen::Playlists => render_playlists(f, top_chunks[1], state),
        ActiveScreen::Insights  => render_insights(f, top_chunks[1], state),
    }

    render_player_bar(f, main_chunks[1], state);

    if state.is_logging_in {
        render_auth_overlay(f, size, state);
    }

    if state.show_help {
        render_help(f, size);
    }

    if let Some(ref notif) = state.notification {
        render_notification(f, size, notif.is_error, &notif.message);
    }
}

fn render_auth_overlay(f: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(70, 50, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(" ♫ likeshelf · Spotify login ", title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(border_style(true))
        .style(normal_style().bg(BG_ALT));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let lines = match state.auth_url {
        Some(ref url) => vec![
            Line::from(Span::raw("")),
            Line::from(Span::styled("  Opening browser for Spotify login...", accent_style())),
            Line::from(Span::raw("")),
            Line::from(Span::styled("  If the browser didn't open, visit:", dim_style())),
            Line::from(Span::raw("")),
            Line::from(Span::styled(format!("  {url}"), highlight_style())),
            Line::from(Span::raw("")),
            Line::from(Span::styled("  ⠋ Waiting for authorization...", muted_style())),
            Line::from(Span::raw("")),
            Line::from(Span::styled("  Esc cancels · q quits", dim_style())),
        ],
        None => vec![
            Line::from(Span::raw("")),
            Line::from(Span::styled("  Connecting to Spotify...", accent_style())),
        ],
    };

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_notification(f: &mut Frame, area: Rect, is_error: bool, message: &str) {
    let max_text = 70.min(area.width.saturating_sub(8) as usize);
    let text = truncate_str(message, max_text);
    let toast_width = (text.width() as u16 + 6).min(area.width);
    let toast_area = Rect {
        x: area.width.saturating_sub(toast_width + 2),
        y: area.height.saturating_sub(8),
        width: toast_width,
        height: 3.min(area.height),
    };

    f.render_widget(Clear, toast_area);

    let style = if is_error { error_style() } else { playing_style() };
    let icon = if is_error { "✖ " } else { "✔ " };

    let para = Paragraph::new(Line::from(vec![
        Span::styled(icon, style),
        Span::styled(text, style),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(style),
    )
    .alignment(Alignment::Left);

    f.render_widget(para, toast_area);
}
