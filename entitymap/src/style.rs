//! Connector line color.
//!
//! Colors are carried through to the map surface as HTML hex strings, the
//! format web mapping libraries accept for path styling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string did not start with `#`.
    #[error("Color must start with '#': {0}")]
    MissingHash(String),

    /// Wrong number of hex digits.
    #[error("Color must be #rrggbb or #rrggbbaa: {0}")]
    InvalidLength(String),

    /// A character was not a hex digit.
    #[error("Invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Leaflet's default path blue.
    pub const BLUE: Rgba = Rgba::rgb(0x33, 0x88, 0xff);

    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Opaque red.
    pub const RED: Rgba = Rgba::rgb(0xff, 0, 0);

    /// Create a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Create a color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// HTML hex form: `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLUE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(trimmed.to_string()))?;

        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorError::InvalidLength(trimmed.to_string()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(trimmed.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidDigit(trimmed.to_string()))
        };

        let a = if hex.len() == 8 { channel(6)? } else { 0xff };
        Ok(Rgba::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_color_omits_alpha() {
        assert_eq!(Rgba::BLUE.to_html(), "#3388ff");
    }

    #[test]
    fn test_translucent_color_includes_alpha() {
        assert_eq!(Rgba::rgba(255, 0, 0, 0x80).to_html(), "#ff000080");
    }

    #[test]
    fn test_parse_six_digits() {
        let color: Rgba = "#3388FF".parse().unwrap();
        assert_eq!(color, Rgba::BLUE);
    }

    #[test]
    fn test_parse_eight_digits() {
        let color: Rgba = "#00ff0040".parse().unwrap();
        assert_eq!(color, Rgba::rgba(0, 255, 0, 0x40));
    }

    #[test]
    fn test_parse_rejects_missing_hash() {
        assert!(matches!(
            "3388ff".parse::<Rgba>(),
            Err(ColorError::MissingHash(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            "#38f".parse::<Rgba>(),
            Err(ColorError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            "#zz88ff".parse::<Rgba>(),
            Err(ColorError::InvalidDigit(_))
        ));
    }
}
