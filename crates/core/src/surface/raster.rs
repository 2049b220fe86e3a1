use image::{Rgba, RgbaImage};
use nox_protocol::{Color, Point, Rect, RenderCommand, Viewport};

use super::Surface;

/// Software surface backed by an RGBA buffer (unpremultiplied, source-over).
///
/// Used for snapshots and tests; pixels are covered when their centre lies
/// inside a shape, with no anti-aliasing.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            image: RgbaImage::new(viewport.width, viewport.height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Inclusive-exclusive pixel range covering `[lo, hi)` clipped to `0..max`.
    fn span(lo: f64, hi: f64, max: u32) -> std::ops::Range<u32> {
        let start = lo.floor().max(0.0).min(f64::from(max)) as u32;
        let end = hi.ceil().max(0.0).min(f64::from(max)) as u32;
        start..end
    }

    fn clear(&mut self, rect: Rect) {
        let xs = Self::span(rect.x, rect.x + rect.w, self.image.width());
        let ys = Self::span(rect.y, rect.y + rect.h, self.image.height());
        for y in ys {
            for x in xs.clone() {
                self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let xs = Self::span(center.x - radius, center.x + radius, self.image.width());
        let ys = Self::span(center.y - radius, center.y + radius, self.image.height());
        let r2 = radius * radius;
        for y in ys {
            let dy = f64::from(y) + 0.5 - center.y;
            for x in xs.clone() {
                let dx = f64::from(x) + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    let dst = self.image.get_pixel_mut(x, y);
                    *dst = blend_over(*dst, color);
                }
            }
        }
    }
}

fn blend_over(dst: Rgba<u8>, src: Color) -> Rgba<u8> {
    let sa = f64::from(src.a.clamp(0.0, 1.0));
    let da = f64::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: f32, d: u8| {
        let s = f64::from(s.clamp(0.0, 1.0));
        let d = f64::from(d) / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        (c * 255.0).round() as u8
    };
    Rgba([
        channel(src.r, dst.0[0]),
        channel(src.g, dst.0[1]),
        channel(src.b, dst.0[2]),
        (out_a * 255.0).round() as u8,
    ])
}

impl Surface for RasterSurface {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.image.width(), self.image.height())
    }

    fn resize(&mut self, viewport: Viewport) {
        // Like a canvas, resizing discards the contents.
        self.image = RgbaImage::new(viewport.width, viewport.height);
    }

    fn draw(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::Clear { rect } => self.clear(*rect),
                RenderCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => self.fill_circle(*center, *radius, *color),
            }
        }
    }
}
