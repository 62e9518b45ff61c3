//! Highlighted row of one item table
//!
//! Wraps the ratatui [`TableState`] so the scroll offset survives between
//! frames and can be used to map mouse clicks back to rows.

use ratatui::widgets::TableState;

#[derive(Debug, Default, Clone)]
pub struct RowSelection {
    pub state: TableState,
}

impl RowSelection {
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// First visible row
    pub fn offset(&self) -> usize {
        self.state.offset()
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.state.select(Some(next));
    }

    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let prev = self.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn select_first(&mut self, len: usize) {
        if len > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self, len: usize) {
        if len > 0 {
            self.state.select(Some(len - 1));
        }
    }

    pub fn select(&mut self, index: usize, len: usize) {
        if len > 0 {
            self.state.select(Some(index.min(len - 1)));
        }
    }

    /// Keep the selection inside a collection that may have shrunk or grown
    pub fn clamp(&mut self, len: usize) {
        match (self.selected(), len) {
            (_, 0) => self.state.select(None),
            (None, _) => self.state.select(Some(0)),
            (Some(i), _) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }
}
