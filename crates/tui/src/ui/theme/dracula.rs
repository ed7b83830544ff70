use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

// Dracula palette (https://draculatheme.com/contribute)
const BACKGROUND: Color = Color::Rgb(0x28, 0x2A, 0x36);
const CURRENT_LINE: Color = Color::Rgb(0x44, 0x47, 0x5A);
const FOREGROUND: Color = Color::Rgb(0xF8, 0xF8, 0xF2);
const COMMENT: Color = Color::Rgb(0x62, 0x72, 0xA4);
const CYAN: Color = Color::Rgb(0x8B, 0xE9, 0xFD);
const GREEN: Color = Color::Rgb(0x50, 0xFA, 0x7B);
const ORANGE: Color = Color::Rgb(0xFF, 0xB8, 0x6C);
const PINK: Color = Color::Rgb(0xFF, 0x79, 0xC6);
const PURPLE: Color = Color::Rgb(0xBD, 0x93, 0xF9);
const RED: Color = Color::Rgb(0xFF, 0x55, 0x55);

/// Default theme tuned for dark terminals.
#[derive(Debug, Clone)]
pub struct DraculaTheme {
    roles: ThemeRoles,
}

impl Default for DraculaTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DraculaTheme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                surface: BACKGROUND,
                border: CURRENT_LINE,
                text: FOREGROUND,
                text_secondary: PURPLE,
                text_muted: COMMENT,
                accent_primary: PINK,
                accent_secondary: CYAN,
                success: GREEN,
                warning: ORANGE,
                error: RED,
                selection_bg: CURRENT_LINE,
                selection_fg: FOREGROUND,
                // Cyan for the focused panel
                focus: CYAN,
            },
        }
    }
}

impl Theme for DraculaTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
