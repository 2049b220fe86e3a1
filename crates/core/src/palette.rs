use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use nox_protocol::{ColorParseError, Rgb, Theme};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaletteConfig;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Two-color theme seed extracted from a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: Rgb,
    pub accent: Rgb,
}

impl Palette {
    /// Derive the accent from an averaged primary color.
    pub fn from_primary(primary: Rgb, config: &PaletteConfig) -> Self {
        let reference = if primary.r > primary.b {
            config.warm_reference
        } else {
            config.cool_reference
        };
        Self {
            primary,
            accent: primary.mix(reference, config.accent_ratio),
        }
    }

    /// Full theme, including the elevated background shade.
    pub fn theme(&self, config: &PaletteConfig) -> Theme {
        Theme {
            primary: self.primary,
            accent: self.accent,
            bg_elev: self
                .primary
                .mix(config.elevation_target, config.elevation_ratio),
        }
    }
}

/// Rounded mean color of the RGBA samples whose alpha is at least
/// `alpha_threshold`. `None` when no sample qualifies.
///
/// `samples` is a tightly packed RGBA buffer (as returned by a canvas
/// `getImageData`); a trailing partial pixel is ignored.
pub fn average_opaque(samples: &[u8], alpha_threshold: u8) -> Option<Rgb> {
    let mut sums = [0u64; 3];
    let mut n = 0u64;
    for px in samples.chunks_exact(4) {
        if px[3] < alpha_threshold {
            continue;
        }
        sums[0] += u64::from(px[0]);
        sums[1] += u64::from(px[1]);
        sums[2] += u64::from(px[2]);
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let mean = |sum: u64| (sum as f64 / n as f64).round() as u8;
    Some(Rgb::new(mean(sums[0]), mean(sums[1]), mean(sums[2])))
}

/// Palette from already-downsampled RGBA samples.
pub fn palette_from_rgba(samples: &[u8], config: &PaletteConfig) -> Option<Palette> {
    average_opaque(samples, config.alpha_threshold).map(|p| Palette::from_primary(p, config))
}

/// Downsample `image` to the configured square and extract its palette.
///
/// Returns `None` for zero-sized or fully transparent images.
pub fn extract_palette(image: &DynamicImage, config: &PaletteConfig) -> Option<Palette> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let sampled = downsample(image, config.sample_size);
    let palette = palette_from_rgba(sampled.as_raw(), config);
    match &palette {
        Some(p) => tracing::debug!(primary = %p.primary, accent = %p.accent, "extracted palette"),
        None => tracing::debug!("no opaque pixels; no palette"),
    }
    palette
}

/// Decode an encoded image (PNG, JPEG, WebP) and extract its palette.
pub fn decode_palette(bytes: &[u8], config: &PaletteConfig) -> Result<Option<Palette>, PaletteError> {
    let image = image::load_from_memory(bytes)?;
    Ok(extract_palette(&image, config))
}

/// Resize in premultiplied space so transparent pixels contribute no colour,
/// matching what a canvas `drawImage` + `getImageData` hands back.
fn downsample(image: &DynamicImage, side: u32) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    if rgba.width() == side && rgba.height() == side {
        return rgba;
    }
    for px in rgba.pixels_mut() {
        let a = u32::from(px[3]);
        for c in &mut px.0[..3] {
            *c = ((u32::from(*c) * a + 127) / 255) as u8;
        }
    }
    let mut resized = imageops::resize(&rgba, side, side, FilterType::Triangle);
    for px in resized.pixels_mut() {
        let a = u32::from(px[3]);
        for c in &mut px.0[..3] {
            *c = match a {
                0 => 0,
                a => ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8,
            };
        }
    }
    resized
}

/// Mix two hex colors: per channel `round(a * (1 - ratio) + b * ratio)`.
pub fn mix_hex(a: &str, b: &str, ratio: f64) -> Result<String, ColorParseError> {
    let a: Rgb = a.parse()?;
    let b: Rgb = b.parse()?;
    Ok(a.mix(b, ratio).to_hex())
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn solid(side: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(side, side, Rgba(px)))
    }

    #[test]
    fn mix_hex_midpoint() {
        assert_eq!(mix_hex("#000000", "#ffffff", 0.5).unwrap(), "#808080");
    }

    #[test]
    fn mix_hex_rejects_garbage() {
        assert!(mix_hex("#nothex", "#ffffff", 0.5).is_err());
    }

    #[test]
    fn transparent_image_has_no_palette() {
        let config = PaletteConfig::default();
        assert_eq!(extract_palette(&solid(64, [255, 0, 0, 0]), &config), None);
        assert_eq!(extract_palette(&solid(64, [255, 0, 0, 15]), &config), None);
    }

    #[test]
    fn zero_sized_image_has_no_palette() {
        let config = PaletteConfig::default();
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert_eq!(extract_palette(&empty, &config), None);
    }

    #[test]
    fn solid_red_mixes_toward_violet() {
        let config = PaletteConfig::default();
        let palette = extract_palette(&solid(64, [255, 0, 0, 255]), &config).unwrap();
        assert_eq!(palette.primary, Rgb::new(0xff, 0, 0));
        assert_eq!(palette.accent, Rgb::new(0xff, 0, 0).mix(Rgb::new(0xb6, 0x8c, 0xff), 0.35));
        assert_eq!(palette.accent.to_hex(), "#e53159");
    }

    #[test]
    fn blue_leaning_mixes_toward_blue_reference() {
        let config = PaletteConfig::default();
        let palette = Palette::from_primary(Rgb::new(0x10, 0x20, 0x80), &config);
        assert_eq!(
            palette.accent,
            Rgb::new(0x10, 0x20, 0x80).mix(Rgb::new(0x6f, 0x7c, 0xff), 0.35)
        );
    }

    #[test]
    fn equal_red_and_blue_uses_blue_reference() {
        let config = PaletteConfig::default();
        let gray = Rgb::new(0x80, 0x80, 0x80);
        let palette = Palette::from_primary(gray, &config);
        assert_eq!(palette.accent, gray.mix(config.cool_reference, 0.35));
    }

    #[test]
    fn average_skips_faint_pixels() {
        let samples = [
            200, 100, 0, 255, // counted
            0, 0, 0, 15, // skipped
            100, 50, 0, 16, // counted
        ];
        assert_eq!(average_opaque(&samples, 16), Some(Rgb::new(150, 75, 0)));
    }

    #[test]
    fn average_rounds_half_up() {
        let samples = [1, 0, 0, 255, 2, 0, 0, 255];
        assert_eq!(average_opaque(&samples, 16), Some(Rgb::new(2, 0, 0)));
    }

    #[test]
    fn large_sources_are_downsampled() {
        let config = PaletteConfig::default();
        let palette = extract_palette(&solid(300, [0, 128, 255, 255]), &config).unwrap();
        assert_eq!(palette.primary, Rgb::new(0, 128, 255));
    }

    #[test]
    fn transparent_neighbours_do_not_tint_edges() {
        let config = PaletteConfig::default();
        let mut logo = RgbaImage::new(128, 128);
        for (x, _, px) in logo.enumerate_pixels_mut() {
            *px = if x < 64 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 0]) };
        }
        let palette = extract_palette(&DynamicImage::ImageRgba8(logo), &config).unwrap();
        assert_eq!(palette.primary.to_hex(), "#ff0000");
    }

    #[test]
    fn white_disc_on_clear_black_stays_white() {
        let config = PaletteConfig::default();
        let mut logo = RgbaImage::new(100, 100);
        for (x, y, px) in logo.enumerate_pixels_mut() {
            let (dx, dy) = (f64::from(x) - 49.5, f64::from(y) - 49.5);
            *px = if dx * dx + dy * dy <= 40.0 * 40.0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            };
        }
        let palette = extract_palette(&DynamicImage::ImageRgba8(logo), &config).unwrap();
        assert_eq!(palette.primary, Rgb::WHITE);
    }

    #[test]
    fn theme_elevation_is_primary_toward_black() {
        let config = PaletteConfig::default();
        let palette = Palette::from_primary(Rgb::new(0xff, 0, 0), &config);
        let theme = palette.theme(&config);
        assert_eq!(theme.bg_elev, Rgb::new(0xff, 0, 0).mix(Rgb::BLACK, 0.7));
        assert_eq!(theme.primary, palette.primary);
        assert_eq!(theme.accent, palette.accent);
    }

    #[test]
    fn decode_rejects_non_images() {
        let config = PaletteConfig::default();
        assert!(decode_palette(b"definitely not a png", &config).is_err());
    }

    #[test]
    fn decode_png_roundtrip() {
        let config = PaletteConfig::default();
        let mut bytes = Vec::new();
        solid(8, [0, 200, 0, 255])
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let palette = decode_palette(&bytes, &config).unwrap().unwrap();
        assert_eq!(palette.primary, Rgb::new(0, 200, 0));
    }
}
