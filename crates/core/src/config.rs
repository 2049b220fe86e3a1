use nox_protocol::Rgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for star generation and the twinkle animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Hard cap on the star count, bounding per-frame drawing cost.
    pub max_stars: usize,
    /// Viewports at least this wide use `wide_density`.
    pub wide_breakpoint: u32,
    /// Stars per square pixel on wide viewports.
    pub wide_density: f64,
    /// Stars per square pixel below the breakpoint.
    pub narrow_density: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    pub min_twinkle: f64,
    pub max_twinkle: f64,
    /// Rendered radius is `depth * radius_scale`.
    pub radius_scale: f64,
    pub alpha_base: f64,
    pub alpha_amplitude: f64,
    pub twinkle_period_ms: f64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            max_stars: 800,
            wide_breakpoint: 900,
            wide_density: 0.0018,
            narrow_density: 0.0012,
            min_depth: 0.2,
            max_depth: 1.0,
            min_twinkle: 0.2,
            max_twinkle: 0.8,
            radius_scale: 1.6,
            alpha_base: 0.6,
            alpha_amplitude: 0.25,
            twinkle_period_ms: 800.0,
        }
    }
}

impl StarfieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !non_negative(self.wide_density) || !non_negative(self.narrow_density) {
            return Err(ConfigError::Invalid {
                field: "density",
                reason: "must be a non-negative number",
            });
        }
        if !ordered(self.min_depth, self.max_depth) {
            return Err(ConfigError::Invalid {
                field: "depth",
                reason: "min_depth must be below max_depth",
            });
        }
        if !ordered(self.min_twinkle, self.max_twinkle) {
            return Err(ConfigError::Invalid {
                field: "twinkle",
                reason: "min_twinkle must be below max_twinkle",
            });
        }
        if !ordered(0.0, self.twinkle_period_ms) {
            return Err(ConfigError::Invalid {
                field: "twinkle_period_ms",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

// NaN fails both checks.
fn ordered(lo: f64, hi: f64) -> bool {
    lo < hi
}

fn non_negative(v: f64) -> bool {
    v >= 0.0
}

/// Tunables for logo color extraction and theme derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Side of the square the source image is downsampled to before averaging.
    pub sample_size: u32,
    /// Pixels with alpha below this are ignored.
    pub alpha_threshold: u8,
    /// How far the accent moves from the primary toward its reference hue.
    pub accent_ratio: f64,
    /// Accent reference when red outweighs blue.
    pub warm_reference: Rgb,
    /// Accent reference otherwise.
    pub cool_reference: Rgb,
    pub elevation_target: Rgb,
    pub elevation_ratio: f64,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            sample_size: 64,
            alpha_threshold: 16,
            accent_ratio: 0.35,
            warm_reference: Rgb::new(0xb6, 0x8c, 0xff),
            cool_reference: Rgb::new(0x6f, 0x7c, 0xff),
            elevation_target: Rgb::BLACK,
            elevation_ratio: 0.7,
        }
    }
}

impl PaletteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == 0 {
            return Err(ConfigError::Invalid {
                field: "sample_size",
                reason: "must be at least 1",
            });
        }
        if !self.accent_ratio.is_finite() || !self.elevation_ratio.is_finite() {
            return Err(ConfigError::Invalid {
                field: "ratio",
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

/// Full page configuration. Every field is optional in the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoxConfig {
    pub starfield: StarfieldConfig,
    pub palette: PaletteConfig,
}

impl NoxConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: NoxConfig = serde_json::from_str(text)?;
        config.starfield.validate()?;
        config.palette.validate()?;
        Ok(config)
    }
}
