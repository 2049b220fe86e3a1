pub mod controller;

use nox_protocol::{Color, Point, RenderCommand, Viewport};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::StarfieldConfig;

pub use controller::{Environment, FrameHandle, FrameScheduler, StarfieldController};

/// One background star. Never mutated after generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    /// Depth in `[min_depth, max_depth)`; drives the rendered radius.
    pub z: f64,
    /// Twinkle rate in `[min_twinkle, max_twinkle)`.
    pub tw: f64,
}

impl Star {
    pub fn radius(&self, config: &StarfieldConfig) -> f64 {
        self.z * config.radius_scale
    }

    /// Fill opacity at `timestamp_ms`: `base + amplitude * sin(t / period * tw + x)`.
    ///
    /// Clamped to `[0, 1]`; with the default tunables the value already stays
    /// within `[0.35, 0.85]`.
    pub fn alpha(&self, config: &StarfieldConfig, timestamp_ms: f64) -> f64 {
        let phase = (timestamp_ms / config.twinkle_period_ms) * self.tw + self.x;
        (config.alpha_base + phase.sin() * config.alpha_amplitude).clamp(0.0, 1.0)
    }
}

/// Stars per square pixel for a viewport, switching at the width breakpoint.
pub fn density(config: &StarfieldConfig, viewport: Viewport) -> f64 {
    if viewport.width >= config.wide_breakpoint {
        config.wide_density
    } else {
        config.narrow_density
    }
}

/// `min(max_stars, floor(width * height * density))`.
pub fn star_count(config: &StarfieldConfig, viewport: Viewport) -> usize {
    let wanted = (viewport.area() * density(config, viewport)).floor();
    if wanted <= 0.0 {
        return 0;
    }
    (wanted as usize).min(config.max_stars)
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

/// A generated star set together with the viewport it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarField {
    viewport: Viewport,
    stars: Vec<Star>,
}

impl StarField {
    /// Generate a fresh star set filling `viewport`.
    pub fn generate<R: Rng + ?Sized>(
        config: &StarfieldConfig,
        viewport: Viewport,
        rng: &mut R,
    ) -> Self {
        let count = star_count(config, viewport);
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let stars = (0..count)
            .map(|_| Star {
                x: sample(rng, 0.0, width),
                y: sample(rng, 0.0, height),
                z: sample(rng, config.min_depth, config.max_depth),
                tw: sample(rng, config.min_twinkle, config.max_twinkle),
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            count = stars.len(),
            "generated star field"
        );
        Self { viewport, stars }
    }

    /// Build a field from an existing star list (e.g. restored or hand-made).
    pub fn from_stars(viewport: Viewport, stars: Vec<Star>) -> Self {
        Self { viewport, stars }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Commands for one frame: clear the whole surface, then one white
    /// circle per star. A pure function of the field and `timestamp_ms`.
    pub fn render(&self, config: &StarfieldConfig, timestamp_ms: f64) -> Vec<RenderCommand> {
        let mut commands = Vec::with_capacity(self.stars.len() + 1);
        commands.push(RenderCommand::Clear {
            rect: self.viewport.bounds(),
        });
        for star in &self.stars {
            commands.push(RenderCommand::FillCircle {
                center: Point::new(star.x, star.y),
                radius: star.radius(config),
                color: Color::WHITE.with_alpha(star.alpha(config, timestamp_ms) as f32),
            });
        }
        commands
    }
}
