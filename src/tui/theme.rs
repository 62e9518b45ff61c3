//! Color themes for the TUI

use std::fmt;

use ratatui::style::Color;

use crate::config::TuiTheme;

/// A complete color theme for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub base: Color,     // Main background
    pub surface0: Color, // Selected row, popups
    pub surface1: Color, // Borders, separators
    pub text: Color,
    pub subtext0: Color, // Hints, secondary text
    pub blue: Color,     // Focus, highlights
    pub green: Color,    // Success
    pub yellow: Color,   // Key hints, pending work
    pub red: Color,      // Errors, deletes
    pub mauve: Color,    // Titles
}

pub const CATPPUCCIN_MOCHA: Theme = Theme {
    name: "Catppuccin Mocha",
    base: Color::Rgb(30, 30, 46),
    surface0: Color::Rgb(49, 50, 68),
    surface1: Color::Rgb(69, 71, 90),
    text: Color::Rgb(205, 214, 244),
    subtext0: Color::Rgb(166, 173, 200),
    blue: Color::Rgb(137, 180, 250),
    green: Color::Rgb(166, 227, 161),
    yellow: Color::Rgb(249, 226, 175),
    red: Color::Rgb(243, 139, 168),
    mauve: Color::Rgb(203, 166, 247),
};

pub const CATPPUCCIN_LATTE: Theme = Theme {
    name: "Catppuccin Latte",
    base: Color::Rgb(239, 241, 245),
    surface0: Color::Rgb(204, 208, 218),
    surface1: Color::Rgb(188, 192, 204),
    text: Color::Rgb(76, 79, 105),
    subtext0: Color::Rgb(108, 111, 133),
    blue: Color::Rgb(30, 102, 245),
    green: Color::Rgb(64, 160, 43),
    yellow: Color::Rgb(223, 142, 29),
    red: Color::Rgb(210, 15, 57),
    mauve: Color::Rgb(136, 57, 239),
};

pub const NORD: Theme = Theme {
    name: "Nord",
    base: Color::Rgb(46, 52, 64),
    surface0: Color::Rgb(59, 66, 82),
    surface1: Color::Rgb(76, 86, 106),
    text: Color::Rgb(236, 239, 244),
    subtext0: Color::Rgb(216, 222, 233),
    blue: Color::Rgb(136, 192, 208),
    green: Color::Rgb(163, 190, 140),
    yellow: Color::Rgb(235, 203, 139),
    red: Color::Rgb(191, 97, 106),
    mauve: Color::Rgb(180, 142, 173),
};

/// Available theme variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    CatppuccinMocha,
    CatppuccinLatte,
    Nord,
}

impl ThemeVariant {
    pub fn theme(&self) -> Theme {
        match self {
            Self::CatppuccinMocha => CATPPUCCIN_MOCHA,
            Self::CatppuccinLatte => CATPPUCCIN_LATTE,
            Self::Nord => NORD,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::CatppuccinMocha => Self::CatppuccinLatte,
            Self::CatppuccinLatte => Self::Nord,
            Self::Nord => Self::CatppuccinMocha,
        }
    }
}

impl From<TuiTheme> for ThemeVariant {
    fn from(theme: TuiTheme) -> Self {
        match theme {
            TuiTheme::CatppuccinMocha => Self::CatppuccinMocha,
            TuiTheme::CatppuccinLatte => Self::CatppuccinLatte,
            TuiTheme::Nord => Self::Nord,
        }
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.theme().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_returns_to_start() {
        let start = ThemeVariant::default();
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_from_config() {
        assert_eq!(ThemeVariant::from(TuiTheme::Nord).to_string(), "Nord");
    }
}
