//! Popups drawn over the table: help, item detail, delete confirmation

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::super::app::{App, PendingDelete};
use super::super::theme::Theme;
use super::helpers::centered_rect;

const SHORTCUTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/↓", "Move down"),
            ("k/↑", "Move up"),
            ("g/G", "First / last row"),
            ("1-3", "Students, books, codes"),
            ("Tab", "Next item type"),
        ],
    ),
    (
        "Items",
        &[
            ("Enter", "Open selected item"),
            ("n", "New item"),
            ("e", "Edit open item"),
            ("d", "Delete item"),
            ("Esc", "Close popup"),
        ],
    ),
    (
        "Other",
        &[
            ("r", "Refresh current list"),
            ("R", "Refresh everything"),
            (":", "Command palette"),
            ("t", "Cycle theme"),
            ("q", "Quit"),
        ],
    ),
];

pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_area = centered_rect(50, 70, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (section, keys) in SHORTCUTS {
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<9}"), Style::default().fg(theme.yellow)),
                Span::styled(*action, Style::default().fg(theme.text)),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(theme.subtext0),
    )));

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.mauve))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
                ))
                .style(Style::default().bg(theme.base)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help, popup_area);
}

/// Read-only view of the focused item in update scope
pub fn render_item_detail(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let focus = &app.session.focus;

    let mut lines = vec![Line::from("")];
    match focus.focus_item() {
        Some(item) => {
            let labels = item.item_type().labels();
            let cells = super::helpers::item_cells(item, &app.session.cache);
            for (label, value) in labels.iter().zip(cells) {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {label:<12}"), Style::default().fg(theme.subtext0)),
                    Span::styled(value, Style::default().fg(theme.text)),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<12}", "Id"), Style::default().fg(theme.subtext0)),
                Span::styled(item.id().to_string(), Style::default().fg(theme.surface1)),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            " Item not found in the cached list",
            Style::default().fg(theme.yellow),
        ))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" e", Style::default().fg(theme.yellow)),
        Span::styled(" edit ", Style::default().fg(theme.subtext0)),
        Span::styled(" d", Style::default().fg(theme.red)),
        Span::styled(" delete ", Style::default().fg(theme.subtext0)),
        Span::styled(" Esc", Style::default().fg(theme.yellow)),
        Span::styled(" close", Style::default().fg(theme.subtext0)),
    ]));

    let detail = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.blue))
                .title(Span::styled(
                    format!(" {} ", focus.display_title()),
                    Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
                ))
                .style(Style::default().bg(theme.base)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(detail, area);
}

pub fn render_confirmation_dialog(
    frame: &mut Frame,
    pending: &PendingDelete,
    theme: &Theme,
    area: Rect,
) {
    let popup_area = centered_rect(50, 30, area);

    let content = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Delete {} \"{}\"?", pending.item_type, pending.title),
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(theme.subtext0)),
            Span::styled(
                "y",
                Style::default().fg(theme.green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to confirm, ", Style::default().fg(theme.subtext0)),
            Span::styled("n", Style::default().fg(theme.red).add_modifier(Modifier::BOLD)),
            Span::styled(" or ", Style::default().fg(theme.subtext0)),
            Span::styled(
                "Esc",
                Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to cancel", Style::default().fg(theme.subtext0)),
        ]),
    ]);

    let popup = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.red))
                .title(Span::styled(
                    " Delete ",
                    Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
                ))
                .style(Style::default().bg(theme.base)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}
