//! UI rendering for the TUI

pub mod form;
pub mod helpers;
pub mod overlays;
pub mod table;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use super::app::{App, InputMode};
use super::theme::Theme;
use crate::models::ItemType;
use form::PopupForm;
use helpers::{centered_rect, format_relative_time};

/// Main render function
pub fn render(frame: &mut Frame, app: &mut App) {
    let theme = app.theme();
    let area = frame.area();

    // Base background
    frame.render_widget(Block::default().style(Style::default().bg(theme.base)), area);

    // Main layout: header, body, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, app, &theme, chunks[0]);
    render_body(frame, app, &theme, chunks[1]);
    render_footer(frame, app, &theme, chunks[2]);

    // Overlays, in order of priority
    if app.session.focus.show_popup() {
        render_popup(frame, app, &theme, area);
    }

    if app.show_help {
        overlays::render_help_overlay(frame, &theme, area);
    }

    if let Some(pending) = &app.pending_delete {
        overlays::render_confirmation_dialog(frame, pending, &theme, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let current = app.item_type();
    let titles: Vec<Line> = ItemType::all()
        .iter()
        .map(|t| {
            let style = if *t == current {
                Style::default().fg(theme.blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0)
            };
            Line::from(Span::styled(
                format!(" {} {} ", t.index() + 1, t.general_title()),
                style,
            ))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.surface1))
                .title(Span::styled(
                    format!(" miskatonic · {} ", app.session.focus.display_title()),
                    Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
                )),
        )
        .highlight_style(Style::default().fg(theme.blue))
        .select(current.index());

    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let table = app.table();
    table.render(frame, area, &mut app.selection_mut().state, theme);
    app.last_table_area = Some(area);
}

fn render_popup(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let popup_area = centered_rect(60, 50, area);

    match &app.form {
        Some(form) => PopupForm {
            item_type: form.item_type,
            scope: form.scope,
            values: &form.values,
            focused: form.focused,
            error: form.error.as_deref(),
        }
        .render(frame, popup_area, theme),
        None => overlays::render_item_detail(frame, app, theme, popup_area),
    }
}

fn render_footer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(56)])
        .split(area);

    let left: Vec<Span> = if app.input_mode == InputMode::Command {
        let mut spans = vec![
            Span::styled(" :", Style::default().fg(theme.yellow)),
            Span::styled(app.palette.input.clone(), Style::default().fg(theme.text)),
            Span::styled("│", Style::default().fg(theme.blue)), // Cursor
        ];
        for (cmd, _) in app.palette.suggestions() {
            spans.push(Span::styled(format!("  {cmd}"), Style::default().fg(theme.subtext0)));
        }
        spans
    } else if let Some(status) = &app.status_message {
        let color = if status.is_error { theme.red } else { theme.green };
        vec![
            Span::raw(" "),
            Span::styled(status.text.clone(), Style::default().fg(color)),
        ]
    } else {
        key_hints(app, theme)
    };

    frame.render_widget(
        Paragraph::new(Line::from(left)).style(Style::default().bg(theme.surface0)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(sync_status(app, theme))
            .style(Style::default().bg(theme.surface0))
            .right_aligned(),
        chunks[1],
    );
}

fn key_hints(app: &App, theme: &Theme) -> Vec<Span<'static>> {
    let hints: &[(&str, &str)] = if app.input_mode == InputMode::Form {
        &[("Tab", "next"), ("Enter", "save"), ("Esc", "cancel")]
    } else if app.session.focus.show_popup() {
        &[("e", "edit"), ("d", "delete"), ("Esc", "close")]
    } else {
        &[
            ("j/k", "nav"),
            ("Enter", "open"),
            ("n", "new"),
            ("d", "delete"),
            ("r", "refresh"),
            (":", "cmd"),
            ("?", "help"),
        ]
    };

    hints
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {key}"), Style::default().fg(theme.blue)),
                Span::styled(format!(" {label} "), Style::default().fg(theme.subtext0)),
            ]
        })
        .collect()
}

/// Freshness of the current collection and pending background work
fn sync_status(app: &App, theme: &Theme) -> Line<'static> {
    let cache = &app.session.cache;
    let refreshed = cache
        .last_refreshed(app.item_type())
        .map(|t| format!("synced {}", format_relative_time(&t)))
        .unwrap_or_else(|| "not synced".to_string());

    let mut spans = vec![Span::styled(refreshed, Style::default().fg(theme.subtext0))];

    if cache.in_flight() > 0 {
        spans.push(Span::styled(
            format!(" · {} loading", cache.in_flight()),
            Style::default().fg(theme.yellow),
        ));
    }
    if !cache.schedule().is_empty() {
        spans.push(Span::styled(
            format!(" · {} catch-up", cache.schedule().len()),
            Style::default().fg(theme.yellow),
        ));
    }
    spans.push(Span::styled(
        format!(" · {} ", cache.server_url()),
        Style::default().fg(theme.surface1),
    ));
    Line::from(spans)
}
