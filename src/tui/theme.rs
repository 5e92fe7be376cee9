//! TUI color theme

use ratatui::style::Color;

/// TUI color theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub accent: Color,
    pub error: Color,
    pub user_bubble: Color,
    pub user_text: Color,
    pub assistant_bubble: Color,
    pub code_background: Color,
    pub inline_code_background: Color,
    pub input_background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(30, 30, 30),
            text: Color::Rgb(212, 212, 212),
            text_muted: Color::Rgb(128, 128, 128),
            border: Color::Rgb(60, 60, 60),
            accent: Color::Rgb(0, 122, 204),
            error: Color::Rgb(244, 67, 54),
            user_bubble: Color::Rgb(0, 95, 160),
            user_text: Color::Rgb(240, 240, 240),
            assistant_bubble: Color::Rgb(45, 45, 48),
            code_background: Color::Rgb(43, 48, 59),
            inline_code_background: Color::Rgb(62, 62, 66),
            input_background: Color::Rgb(37, 37, 38),
        }
    }
}
