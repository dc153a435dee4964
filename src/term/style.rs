use ratatui::style::{Color, Modifier, Style};

use crate::settings::Theme;

pub const LIGHT_SKY_BLUE: Color = Color::Rgb(0x87, 0xCE, 0xFA);
pub const SLATE: Color = Color::Rgb(0x47, 0x55, 0x69);

pub const PURCHASED: Style = Style::new().fg(Color::LightGreen);
pub const TARGET: Style = Style::new().fg(Color::LightBlue);
pub const TODAY: Style = Style::new()
    .fg(Color::LightMagenta)
    .add_modifier(Modifier::BOLD);
pub const DATE: Style = Style::new().fg(Color::LightYellow);
pub const CATEGORY: Style = Style::new().fg(Color::LightCyan);
pub const NOTES: Style = Style::new().fg(Color::DarkGray);

/// Styles that differ between light and dark terminals.
#[derive(Debug, Copy, Clone)]
pub struct Palette {
    pub border: Style,
    pub highlight: Style,
    pub outside: Style,
}

impl Palette {
    pub fn of(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                border: Style::new().fg(SLATE),
                highlight: Style::new().bg(Color::LightCyan).fg(Color::Black),
                outside: Style::new().fg(Color::Gray),
            },
            Theme::Dark => Self {
                border: Style::new().fg(LIGHT_SKY_BLUE),
                highlight: Style::new().bg(Color::Blue).fg(Color::White),
                outside: Style::new().fg(Color::DarkGray),
            },
        }
    }
}
