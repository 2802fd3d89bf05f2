use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

use crate::domain::models::Theme;

/// Styles used across the interface for one colour theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub base: Style,
    pub border: Style,
    pub accent: Style,
    pub muted: Style,
    pub error: Style,
    pub assistant: Style,
    pub code: Style,
    pub selected: Style,
}

pub struct Themes {}

impl Themes {
    pub fn get(theme: Theme) -> Palette {
        match theme {
            Theme::Light => {
                let base = Style::default().fg(Color::Black).bg(Color::White);
                return Palette {
                    base,
                    border: base.fg(Color::Gray),
                    accent: base.fg(Color::Blue).add_modifier(Modifier::BOLD),
                    muted: base.fg(Color::DarkGray),
                    error: base.fg(Color::Red),
                    assistant: base.fg(Color::Rgb(21, 128, 61)),
                    code: base.fg(Color::Magenta),
                    selected: Style::default().fg(Color::White).bg(Color::Blue),
                };
            }
            Theme::Dark => {
                let base = Style::default().fg(Color::Gray).bg(Color::Black);
                return Palette {
                    base,
                    border: base.fg(Color::DarkGray),
                    accent: base.fg(Color::LightBlue).add_modifier(Modifier::BOLD),
                    muted: base.fg(Color::DarkGray),
                    error: base.fg(Color::LightRed),
                    assistant: base.fg(Color::LightGreen),
                    code: base.fg(Color::Yellow),
                    selected: Style::default().fg(Color::Black).bg(Color::LightBlue),
                };
            }
            // Terminal defaults, only accents are coloured.
            Theme::Auto => {
                return Palette {
                    base: Style::default(),
                    border: Style::default(),
                    accent: Style::default().add_modifier(Modifier::BOLD),
                    muted: Style::default().add_modifier(Modifier::DIM),
                    error: Style::default().fg(Color::Red),
                    assistant: Style::default().fg(Color::Green),
                    code: Style::default().fg(Color::Yellow),
                    selected: Style::default().add_modifier(Modifier::REVERSED),
                };
            }
        }
    }
}
