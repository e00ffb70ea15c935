use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::{make_block, truncate_str};
use crate::app::state::AppState;
use crate::library::analysis::{RankedCount, TasteAnalysis};
use crate::ui::theme::*;

pub fn render_insights(f: &mut Frame, area: Rect, state: &AppState) {
    let insights = &state.insights;
    let Some(analysis) = insights.analysis.as_ref() else {
        let msg = if insights.is_loading {
            "  ⠋ Analysing tracks..."
        } else {
            "  Press i on Liked Songs or an open playlist to analyse it."
        };
        let para = Paragraph::new(Line::from(Span::styled(msg, muted_style())))
            .block(make_block(" ✦ Insights ", false));
        f.render_widget(para, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // attributes + observations
            Constraint::Min(0),     // rankings
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[0]);

    render_attributes(f, top[0], analysis);
    render_observations(f, top[1], analysis, insights.scroll, insights.is_loading);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);

    render_ranking(f, cols[0], " Top Genres ", &analysis.top_genres);
    render_ranking(f, cols[1], " Top Artists ", &analysis.top_artists);
    render_ranking(f, cols[2], " Top Albums ", &analysis.top_albums);
    render_ranking(f, cols[3], " Top Years ", &analysis.top_years);
}

fn render_attributes(f: &mut Frame, area: Rect, analysis: &TasteAnalysis) {
    let rows: Vec<Row> = analysis
        .attributes
        .iter()
        .map(|(attr, stats)| {
            Row::new(vec![
                Cell::from(attr.to_string()).style(normal_style()),
                Cell::from(format!("{:.3}", stats.average)).style(accent_style()),
                Cell::from(format!("{:.3}", stats.min)).style(dim_style()),
                Cell::from(format!("{:.3}", stats.max)).style(dim_style()),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("Attribute").style(header_style()),
        Cell::from("Avg").style(header_style()),
        Cell::from("Min").style(header_style()),
        Cell::from("Max").style(header_style()),
    ]);

    let title = format!(
        " ✦ {} · {} tracks ",
        analysis.kind, analysis.tracks_analyzed
    );
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(make_block(&title, true));
    f.render_widget(table, area);
}

fn render_observations(
    f: &mut Frame,
    area: Rect,
    analysis: &TasteAnalysis,
    scroll: usize,
    refreshing: bool,
) {
    let mut lines: Vec<Line> = analysis
        .observations
        .iter()
        .map(|o| {
            Line::from(vec![
                Span::styled(" • ", highlight_style()),
                Span::styled(o.clone(), normal_style()),
            ])
        })
        .collect();

    if analysis.attributes.is_empty() {
        lines.push(Line::from(Span::styled(
            " No audio attributes were available for these tracks.",
            muted_style(),
        )));
    }
    if analysis.skipped_batches > 0 {
        lines.push(Line::from(Span::styled(
            format!(" {} lookup batches failed; results are partial.", analysis.skipped_batches),
            error_style(),
        )));
    }
    lines.push(Line::from(Span::raw("")));
    let footer = if refreshing {
        " ⠋ Analysing..."
    } else {
        " x export CSV"
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!(" Generated {} ", analysis.generated_at.format("%Y-%m-%d %H:%M")),
            muted_style(),
        ),
        Span::styled(footer, dim_style()),
    ]));

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0))
        .block(make_block(" Observations ", false));
    f.render_widget(para, area);
}

fn render_ranking(f: &mut Frame, area: Rect, title: &str, items: &[RankedCount]) {
    let name_width = (area.width as usize).saturating_sub(12);
    let lines: Vec<Line> = if items.is_empty() {
        vec![Line::from(Span::styled("  none", muted_style()))]
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Line::from(vec![
                    Span::styled(format!("{:>2}. ", i + 1), muted_style()),
                    Span::styled(truncate_str(&item.name, name_width), normal_style()),
                    Span::styled(format!(" {}", item.count), gold_style()),
                ])
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines).block(make_block(title, false)), area);
}
