//! Colour tokens as supplied by external colour controls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SketchError, SketchResult};

/// An 8-bit straight-alpha RGBA colour.
///
/// Serialized as a lowercase hex string (`#rrggbb`, or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white, the default canvas background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black, the default ink.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a colour with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the alpha channel is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a == u8::MAX
    }

    /// Accept the colour only if it is fully opaque.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidColor`] for a translucent colour.
    pub fn ensure_opaque(self) -> SketchResult<Self> {
        if self.is_opaque() {
            Ok(self)
        } else {
            Err(SketchError::InvalidColor(format!("{self} is not opaque")))
        }
    }

    /// Parse a colour token (`#rgb`, `#rrggbb`, `#rrggbbaa`, or a few names).
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidColor`] if the token is not recognised.
    pub fn parse(token: &str) -> SketchResult<Self> {
        let trimmed = token.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        let invalid = || SketchError::InvalidColor(token.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(invalid)?;
                    #[allow(clippy::cast_possible_truncation)]
                    let v = v as u8;
                    *slot = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = SketchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(Color::parse("#FF0000").expect("red"), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("#00ff7f").expect("spring"), Color::rgb(0, 255, 127));
    }

    #[test]
    fn test_parse_short_hex_and_alpha() {
        assert_eq!(Color::parse("#f0a").expect("short"), Color::rgb(255, 0, 170));
        assert_eq!(
            Color::parse("#11223344").expect("alpha"),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Color::parse("White").expect("white"), Color::WHITE);
        assert_eq!(Color::parse(" black ").expect("black"), Color::BLACK);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for token in ["", "red", "#12", "#zzzzzz", "123456", "#1234567", "#ééé"] {
            assert!(Color::parse(token).is_err(), "{token:?} should be rejected");
        }
    }

    #[test]
    fn test_ensure_opaque() {
        assert_eq!(Color::WHITE.ensure_opaque().expect("white"), Color::WHITE);
        assert!(matches!(
            Color::TRANSPARENT.ensure_opaque(),
            Err(SketchError::InvalidColor(_))
        ));
        assert!(Color::rgba(10, 20, 30, 254).ensure_opaque().is_err());
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_string(), "#abcdef");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).expect("serialize");
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00FF00\"").expect("deserialize");
        assert_eq!(back, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
