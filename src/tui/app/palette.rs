//! Command palette input and history

use std::collections::VecDeque;

/// Commands offered by the palette with a short description
pub const COMMANDS: &[(&str, &str)] = &[
    ("quit", "Exit the application"),
    ("help", "Show keyboard shortcuts"),
    ("refresh", "Reload every collection"),
    ("students", "Show students"),
    ("books", "Show books"),
    ("codes", "Show borrow codes"),
    ("new", "Open the create form"),
    ("view", "view <scope> [type] [id|#index]"),
    ("open", "open <create|update>"),
    ("close", "Close the popup"),
    ("theme", "Cycle color theme"),
    ("dispatch", "dispatch <json action>"),
];

const MAX_HISTORY: usize = 50;

#[derive(Debug, Default)]
pub struct CommandPalette {
    /// Current input (after ':')
    pub input: String,
    history: VecDeque<String>,
    /// Position while browsing history, counted from the newest entry
    browsing: Option<usize>,
    /// Input typed before browsing started
    draft: String,
}

impl CommandPalette {
    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop(&mut self) {
        self.input.pop();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.browsing = None;
        self.draft.clear();
    }

    /// Commands whose name starts with the first word of the input
    pub fn suggestions(&self) -> Vec<(&'static str, &'static str)> {
        let Some(word) = self.input.split_whitespace().next() else {
            return Vec::new();
        };
        let word = word.to_lowercase();
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(&word))
            .take(5)
            .copied()
            .collect()
    }

    /// Replace the command word with the first suggestion, keeping arguments
    pub fn autocomplete(&mut self) {
        if let Some((cmd, _)) = self.suggestions().first() {
            let rest = self
                .input
                .trim_start()
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.to_string());
            self.input = match rest {
                Some(rest) => format!("{cmd} {rest}"),
                None => cmd.to_string(),
            };
        }
    }

    /// Record an executed command, skipping repeats of the newest entry
    pub fn remember(&mut self, cmd: &str) {
        let cmd = cmd.trim();
        if cmd.is_empty() || self.history.front().is_some_and(|last| last == cmd) {
            return;
        }
        self.history.push_front(cmd.to_string());
        self.history.truncate(MAX_HISTORY);
    }

    /// Step to an older command (Up)
    pub fn older(&mut self) {
        let next = match self.browsing {
            None if self.history.is_empty() => return,
            None => {
                self.draft = self.input.clone();
                0
            }
            Some(i) => (i + 1).min(self.history.len() - 1),
        };
        self.browsing = Some(next);
        self.input = self.history[next].clone();
    }

    /// Step to a newer command, back to the draft past the newest (Down)
    pub fn newer(&mut self) {
        match self.browsing {
            None => {}
            Some(0) => {
                self.browsing = None;
                self.input = std::mem::take(&mut self.draft);
            }
            Some(i) => {
                self.browsing = Some(i - 1);
                self.input = self.history[i - 1].clone();
            }
        }
    }
}
