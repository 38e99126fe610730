use colored::Color;
use comfy_table::Color as TableColor;
use once_cell::sync::Lazy;
use volboard::StatusTone;

/// CLI color theme configuration
pub struct ColorTheme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub primary: Color,
    pub secondary: Color,
    pub key: Color,
    pub value: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            highlight: Color::Cyan,
            muted: Color::BrightBlack,
            primary: Color::BrightBlue,
            secondary: Color::Magenta,
            key: Color::BrightCyan,
            value: Color::White,
        }
    }
}

/// Global theme instance
pub static THEME: Lazy<ColorTheme> = Lazy::new(ColorTheme::default);

/// Icons for different message types
pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
};

/// Table cell color for a status badge.
pub fn tone_color(tone: StatusTone) -> TableColor {
    match tone {
        StatusTone::Success => TableColor::Green,
        StatusTone::Info => TableColor::Blue,
        StatusTone::Warning => TableColor::Yellow,
        StatusTone::Danger => TableColor::Red,
        StatusTone::Neutral => TableColor::Grey,
    }
}

/// Table cell color for a match percentage.
pub fn percentage_color(percentage: u8) -> TableColor {
    match percentage {
        80..=100 => TableColor::Green,
        50..=79 => TableColor::Yellow,
        _ => TableColor::Red,
    }
}
