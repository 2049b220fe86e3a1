use std::collections::BTreeMap;

use nox_protocol::{Rgb, Theme};

use crate::config::PaletteConfig;
use crate::palette::Palette;

/// Destination for published style variables (e.g. the document root style).
pub trait ThemeSink {
    fn set_variable(&mut self, name: &str, value: &str);
}

impl ThemeSink for BTreeMap<String, String> {
    fn set_variable(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Holds the active theme and pushes every change to its sink.
pub struct ThemePublisher<S> {
    sink: S,
    config: PaletteConfig,
    current: Option<Theme>,
}

impl<S: ThemeSink> ThemePublisher<S> {
    pub fn new(config: PaletteConfig, sink: S) -> Self {
        Self {
            sink,
            config,
            current: None,
        }
    }

    /// The last applied theme, if any logo has been processed yet.
    pub fn current(&self) -> Option<&Theme> {
        self.current.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    /// Publish `primary`, `accent` and the derived elevated background,
    /// replacing whatever was applied before.
    pub fn apply_theme(&mut self, primary: Rgb, accent: Rgb) -> Theme {
        let theme = Theme {
            primary,
            accent,
            bg_elev: primary.mix(self.config.elevation_target, self.config.elevation_ratio),
        };
        for (name, value) in theme.css_variables() {
            self.sink.set_variable(name, &value);
        }
        tracing::info!(
            primary = %theme.primary,
            accent = %theme.accent,
            bg_elev = %theme.bg_elev,
            "applied theme"
        );
        self.current = Some(theme);
        theme
    }

    pub fn apply_palette(&mut self, palette: &Palette) -> Theme {
        self.apply_theme(palette.primary, palette.accent)
    }

    /// Apply the palette if there is one; `None` leaves the theme unchanged.
    pub fn apply_extracted(&mut self, palette: Option<Palette>) -> Option<Theme> {
        palette.map(|p| self.apply_palette(&p))
    }
}
