use crate::settings::ThemeName;
use crossterm::style::Color;
use cube_core::Rgb;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Box and separator color
    pub border: Color,
    /// Cursor marker drawn on the selected cell
    pub cursor: Color,
    /// Error/game over color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Timer color when time is nearly up
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            cursor: Color::Rgb { r: 255, g: 255, b: 255 },
            error: Color::Rgb { r: 255, g: 100, b: 100 },
            success: Color::Rgb { r: 100, g: 220, b: 140 },
            info: Color::Rgb { r: 160, g: 160, b: 180 },
            key: Color::Rgb { r: 255, g: 200, b: 80 },
            warning: Color::Rgb { r: 255, g: 160, b: 60 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 245, g: 245, b: 250 },
            fg: Color::Rgb { r: 20, g: 20, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 200 },
            cursor: Color::Rgb { r: 0, g: 0, b: 0 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 70 },
            info: Color::Rgb { r: 60, g: 60, b: 80 },
            key: Color::Rgb { r: 180, g: 110, b: 0 },
            warning: Color::Rgb { r: 200, g: 100, b: 0 },
        }
    }
}

/// Terminal color for a game color
pub fn term_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Black or white, whichever reads better on `color`
pub fn contrast_color(color: Rgb) -> Color {
    let luma = 299 * color.r as u32 + 587 * color.g as u32 + 114 * color.b as u32;
    if luma > 128_000 {
        Color::Black
    } else {
        Color::White
    }
}
