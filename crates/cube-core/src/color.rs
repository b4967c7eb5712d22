//! Base and odd-cell colors

use crate::config::DifficultyCurve;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value; bits above 24 are ignored
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn as_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn as_hex(&self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    /// Largest per-channel absolute difference
    pub fn distance(self, other: Rgb) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }

    fn saturating_add(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_add(amount),
            self.g.saturating_add(amount),
            self.b.saturating_add(amount),
        )
    }

    fn saturating_sub(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
        )
    }
}

impl From<u32> for Rgb {
    fn from(packed: u32) -> Self {
        Self::from_u32(packed)
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.to_u32()
    }
}

impl DifficultyCurve {
    /// Channel delta for a difficulty level, shrinking from `max_lighten`
    /// down to `min_lighten`. Never below 1, even for a curve that failed
    /// [`GameConfig::validate`](crate::GameConfig::validate).
    pub fn lighten_amount(&self, difficulty: u32) -> u8 {
        let reduction = difficulty.saturating_mul(self.lighten_step as u32);
        let amount = (self.max_lighten as u32).saturating_sub(reduction);
        amount.max(self.min_lighten.max(1) as u32).min(u8::MAX as u32) as u8
    }

    /// Lightened variant of `base` for the odd cell.
    ///
    /// Pure white cannot be lightened, so it is darkened by the same amount.
    /// The result always differs from `base`.
    pub fn different_color(&self, base: Rgb, difficulty: u32) -> Rgb {
        let amount = self.lighten_amount(difficulty);
        let lighter = base.saturating_add(amount);
        if lighter != base {
            lighter
        } else {
            base.saturating_sub(amount)
        }
    }
}

/// Uniformly random 24-bit color
pub fn generate_base_color(rng: &mut GameRng) -> Rgb {
    Rgb::from_u32(rng.below(0x0100_0000))
}

/// [`DifficultyCurve::lighten_amount`] on the default curve
pub fn lighten_amount(difficulty: u32) -> u8 {
    DifficultyCurve::default().lighten_amount(difficulty)
}

/// [`DifficultyCurve::different_color`] on the default curve
pub fn different_color(base: Rgb, difficulty: u32) -> Rgb {
    DifficultyCurve::default().different_color(base, difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_conversion() {
        let color = Rgb::from_u32(0x12_34_56);
        assert_eq!(color, Rgb::new(0x12, 0x34, 0x56));
        assert_eq!(color.to_u32(), 0x12_34_56);
        assert_eq!(color.as_hex(), "#123456");
        assert_eq!(Rgb::from_u32(0xFF_00_00_01), Rgb::new(0, 0, 1));
    }

    #[test]
    fn test_black_at_difficulty_zero() {
        let curve = DifficultyCurve::default();
        let odd = different_color(Rgb::BLACK, 0);
        for channel in [odd.r, odd.g, odd.b] {
            assert!(channel >= curve.min_lighten);
            assert!(channel <= curve.max_lighten);
        }
        assert_eq!(odd, Rgb::new(80, 80, 80));
    }

    #[test]
    fn test_lighten_amount_floor() {
        assert_eq!(lighten_amount(0), 80);
        assert_eq!(lighten_amount(5), 60);
        assert_eq!(lighten_amount(18), 8);
        assert_eq!(lighten_amount(1_000), 8);
        assert_eq!(lighten_amount(u32::MAX), 8);
    }

    #[test]
    fn test_channels_saturate_instead_of_wrapping() {
        let odd = different_color(Rgb::new(250, 10, 200), 0);
        assert_eq!(odd, Rgb::new(255, 90, 255));
    }

    #[test]
    fn test_white_is_darkened() {
        let odd = different_color(Rgb::WHITE, 0);
        assert_eq!(odd, Rgb::new(175, 175, 175));
        assert_ne!(different_color(Rgb::WHITE, 500), Rgb::WHITE);
    }

    #[test]
    fn test_zero_floor_curve_still_differs() {
        let curve = DifficultyCurve {
            min_lighten: 0,
            max_lighten: 0,
            lighten_step: 4,
            ..DifficultyCurve::default()
        };
        assert_eq!(curve.lighten_amount(0), 1);
        assert_eq!(curve.lighten_amount(u32::MAX), 1);
        for base in [Rgb::BLACK, Rgb::WHITE, Rgb::new(255, 0, 255), Rgb::from_u32(0x40_80_c0)] {
            assert_ne!(curve.different_color(base, 500), base);
        }
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let base = Rgb::from_u32(0x40_80_c0);
        assert_eq!(different_color(base, 7), different_color(base, 7));
    }

    #[test]
    fn test_base_color_uses_full_range() {
        let mut rng = GameRng::with_seed(3);
        let colors: Vec<u32> = (0..64).map(|_| generate_base_color(&mut rng).to_u32()).collect();
        assert!(colors.iter().all(|&c| c <= 0xFF_FF_FF));
        assert!(colors.iter().any(|&c| c > 0x80_00_00));
    }
}
