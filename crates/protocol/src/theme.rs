use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Semantic color tokens resolved by a renderer against the active [`Theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Primary,
    Accent,
    BackgroundElevated,

    Background,
    TextPrimary,
    TextMuted,
    Star,
}

/// Page theme derived from the logo: `--primary`, `--accent`, `--bg-elev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: Rgb,
    pub accent: Rgb,
    pub bg_elev: Rgb,
}

impl Theme {
    pub const VAR_PRIMARY: &'static str = "--primary";
    pub const VAR_ACCENT: &'static str = "--accent";
    pub const VAR_BG_ELEV: &'static str = "--bg-elev";

    /// Style variables in publication order.
    pub fn css_variables(&self) -> [(&'static str, String); 3] {
        [
            (Self::VAR_PRIMARY, self.primary.to_hex()),
            (Self::VAR_ACCENT, self.accent.to_hex()),
            (Self::VAR_BG_ELEV, self.bg_elev.to_hex()),
        ]
    }

    pub fn resolve(&self, token: ThemeToken) -> Rgb {
        match token {
            ThemeToken::Primary => self.primary,
            ThemeToken::Accent => self.accent,
            ThemeToken::BackgroundElevated => self.bg_elev,
            ThemeToken::Background => Rgb::new(0x07, 0x06, 0x12),
            ThemeToken::TextPrimary => Rgb::new(0xec, 0xe9, 0xf7),
            ThemeToken::TextMuted => Rgb::new(0xa3, 0x9e, 0xc0),
            ThemeToken::Star => Rgb::WHITE,
        }
    }
}

impl Default for Theme {
    /// The stylesheet's initial values, before any logo has been seen.
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x6f, 0x7c, 0xff),
            accent: Rgb::new(0xb6, 0x8c, 0xff),
            bg_elev: Rgb::new(0x21, 0x25, 0x4d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_elevation_is_primary_toward_black() {
        let t = Theme::default();
        assert_eq!(t.bg_elev, t.primary.mix(Rgb::BLACK, 0.7));
    }

    #[test]
    fn css_variables_are_hex() {
        let vars = Theme::default().css_variables();
        assert_eq!(vars[0], ("--primary", "#6f7cff".to_string()));
        assert_eq!(vars[2].0, "--bg-elev");
    }
}
