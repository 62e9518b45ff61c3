//! Generic table of pre-stringified cells
//!
//! The table knows nothing about item types: callers hand it column labels and
//! a row matrix. Clicks are mapped back to a row position and passed to a
//! caller-supplied handler.

use comfy_table::{Table as PlainTable, presets::UTF8_BORDERS_ONLY};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use super::super::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    title: String,
    labels: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(title: impl Into<String>, labels: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            rows,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Draw the table with the row selected in `state` highlighted
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &mut TableState, theme: &Theme) {
        let label_style = Style::default()
            .fg(theme.blue)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(
            self.labels
                .iter()
                .map(|label| Cell::from(label.as_str()).style(label_style)),
        )
        .height(1);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|cells| {
                Row::new(cells.iter().map(|c| Cell::from(c.as_str())))
                    .style(Style::default().fg(theme.text))
            })
            .collect();

        let widths = vec![Constraint::Fill(1); self.labels.len().max(1)];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.surface1))
                    .title(Span::styled(
                        format!(" {} ", self.title),
                        Style::default()
                            .fg(theme.mauve)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .row_highlight_style(
                Style::default()
                    .bg(theme.surface0)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, state);
    }

    /// Map a screen position inside a table drawn in `area` to a row position.
    /// `offset` is the first visible row. The position is not checked against
    /// the number of rows.
    pub fn row_at(area: Rect, offset: usize, column: u16, row: u16) -> Option<usize> {
        let inner_left = area.x + 1;
        let inner_right = area.x + area.width.saturating_sub(1);
        // Border, then the header line
        let first_row = area.y + 2;
        let bottom = area.y + area.height.saturating_sub(1);

        if column < inner_left || column >= inner_right || row < first_row || row >= bottom {
            return None;
        }
        Some(offset + (row - first_row) as usize)
    }

    /// Resolve a click and hand the row position to `on_click`. Returns whether
    /// the click landed on a row.
    pub fn click(
        &self,
        area: Rect,
        offset: usize,
        column: u16,
        row: u16,
        on_click: impl FnOnce(usize),
    ) -> bool {
        match Self::row_at(area, offset, column, row) {
            Some(index) if index < self.rows.len() => {
                on_click(index);
                true
            }
            _ => false,
        }
    }

    /// Plain-text rendering for terminal output outside the TUI
    pub fn to_plain(&self) -> String {
        let mut table = PlainTable::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(self.labels.clone());
        for cells in &self.rows {
            table.add_row(cells.clone());
        }
        table.to_string()
    }
}
