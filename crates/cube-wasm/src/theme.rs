//! Color themes for the browser UI

use cube_core::Rgb;
use serde::{Deserialize, Serialize};

/// Color theme for the page canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Canvas background
    pub background: Rgb,
    /// Backdrop behind the board
    pub board_bg: Rgb,
    /// Headings and player name
    pub title_text: Rgb,
    /// Info panel text
    pub info_text: Rgb,
    /// Timer color near the end
    pub warning_text: Rgb,
    /// Score color
    pub score_text: Rgb,
    /// Game over color
    pub lose_color: Rgb,
    /// Overlay behind the game over box
    pub overlay: Rgb,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            background: Rgb::new(24, 24, 32),
            board_bg: Rgb::new(32, 32, 44),
            title_text: Rgb::new(200, 200, 220),
            info_text: Rgb::new(160, 160, 180),
            warning_text: Rgb::new(255, 160, 60),
            score_text: Rgb::new(100, 255, 150),
            lose_color: Rgb::new(255, 100, 100),
            overlay: Rgb::new(0, 0, 0),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            background: Rgb::new(245, 245, 250),
            board_bg: Rgb::new(255, 255, 255),
            title_text: Rgb::new(20, 20, 40),
            info_text: Rgb::new(60, 60, 80),
            warning_text: Rgb::new(200, 100, 0),
            score_text: Rgb::new(50, 180, 80),
            lose_color: Rgb::new(220, 50, 50),
            overlay: Rgb::new(255, 255, 255),
        }
    }
}

/// CSS color with transparency
pub fn with_alpha(color: Rgb, alpha: f64) -> String {
    format!("rgba({}, {}, {}, {})", color.r, color.g, color.b, alpha)
}
