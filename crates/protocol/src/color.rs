use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::Color;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 3 or 6 hex digits, got {0} characters")]
    Length(usize),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

/// A 24-bit RGB color. Serializes as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Linear per-channel interpolation toward `other`.
    ///
    /// `ratio = 0.0` yields `self`, `ratio = 1.0` yields `other`. Each channel
    /// is `round(a * (1 - ratio) + b * ratio)`, saturated to `0..=255`.
    pub fn mix(self, other: Rgb, ratio: f64) -> Rgb {
        let m = |a: u8, b: u8| {
            let v = f64::from(a) * (1.0 - ratio) + f64::from(b) * ratio;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(m(self.r, other.r), m(self.g, other.g), m(self.b, other.b))
    }

    pub fn to_color(self) -> Color {
        Color::rgba(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            1.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(s.to_string()));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            n => return Err(ColorParseError::Length(n)),
        };
        let packed = u32::from_str_radix(&expanded, 16)
            .map_err(|_| ColorParseError::Digits(s.to_string()))?;
        Ok(Rgb::from_u32(packed))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!("#b68cff".parse::<Rgb>(), Ok(Rgb::new(0xb6, 0x8c, 0xff)));
        assert_eq!("6f7cff".parse::<Rgb>(), Ok(Rgb::new(0x6f, 0x7c, 0xff)));
        assert_eq!("#fa0".parse::<Rgb>(), Ok(Rgb::new(0xff, 0xaa, 0x00)));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("#abcd".parse::<Rgb>(), Err(ColorParseError::Length(4)));
        assert!(matches!(
            "#zzzzzz".parse::<Rgb>(),
            Err(ColorParseError::Digits(_))
        ));
        assert!(matches!(
            "+12345".parse::<Rgb>(),
            Err(ColorParseError::Digits(_))
        ));
        assert!(matches!(
            "##fff".parse::<Rgb>(),
            Err(ColorParseError::Digits(_))
        ));
    }

    #[test]
    fn formats_lowercase_padded() {
        assert_eq!(Rgb::new(0, 10, 255).to_hex(), "#000aff");
    }

    #[test]
    fn mix_halfway_rounds_up() {
        assert_eq!(Rgb::BLACK.mix(Rgb::WHITE, 0.5), Rgb::new(0x80, 0x80, 0x80));
    }

    #[test]
    fn mix_endpoints() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb::new(0xff, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Rgb = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(back, Rgb::new(0, 0xff, 0));
    }
}
