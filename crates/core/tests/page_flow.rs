//! End-to-end page lifecycle without a display: start the starfield on a
//! software surface, drive a few frames, resize, then feed a logo through
//! palette extraction into the theme publisher.

use std::collections::BTreeMap;

use image::{DynamicImage, Rgba, RgbaImage};
use nox_core::palette::extract_palette;
use nox_core::starfield::{
    Environment, FrameHandle, FrameScheduler, StarfieldController, star_count,
};
use nox_core::surface::{RasterSurface, Surface};
use nox_core::theme::ThemePublisher;
use nox_core::{NoxConfig, StarField};
use nox_protocol::{Rgb, Viewport};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Default)]
struct QueueScheduler {
    next: i32,
    queued: Option<FrameHandle>,
}

impl FrameScheduler for QueueScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        assert!(self.queued.is_none(), "a second frame was requested");
        self.next += 1;
        self.queued = Some(FrameHandle(self.next));
        self.queued
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.queued == Some(handle) {
            self.queued = None;
        }
    }
}

fn lit_pixels(surface: &RasterSurface) -> usize {
    surface.image().pixels().filter(|p| p.0[3] > 0).count()
}

#[test]
fn starfield_draws_and_survives_resize() {
    let config = NoxConfig::default();
    let mut controller = StarfieldController::new(
        config.starfield.clone(),
        RasterSurface::new(Viewport::default()),
        QueueScheduler::default(),
        SmallRng::seed_from_u64(3),
    );

    assert!(controller.start(Environment {
        viewport: Viewport::new(200, 100),
        prefers_reduced_motion: false,
    }));
    assert_eq!(controller.surface().viewport(), Viewport::new(200, 100));
    // floor(200 * 100 * 0.0012) lands on 23 in binary floating point
    assert_eq!(
        controller.field().map(StarField::len),
        Some(star_count(controller.config(), Viewport::new(200, 100)))
    );
    assert!(lit_pixels(controller.surface()) > 0);

    // Host loop: take the queued request, deliver the frame.
    let mut t = 0.0;
    for _ in 0..5 {
        t += 16.6;
        let fired = controller.scheduler_mut().queued.take();
        assert_eq!(fired, controller.pending_frame());
        controller.tick(t);
    }

    controller.resize(Viewport::new(950, 100));
    assert_eq!(controller.surface().viewport(), Viewport::new(950, 100));
    assert_eq!(controller.field().map(StarField::len), Some(171));
    controller.scheduler_mut().queued.take();
    controller.tick(t + 16.6);
    assert!(lit_pixels(controller.surface()) > 0);

    controller.stop();
    assert_eq!(controller.pending_frame(), None);
}

#[test]
fn reduced_motion_never_touches_surface() {
    let mut controller = StarfieldController::new(
        NoxConfig::default().starfield,
        RasterSurface::new(Viewport::new(3, 3)),
        QueueScheduler::default(),
        SmallRng::seed_from_u64(3),
    );
    assert!(!controller.start(Environment {
        viewport: Viewport::new(640, 480),
        prefers_reduced_motion: true,
    }));
    assert_eq!(controller.surface().viewport(), Viewport::new(3, 3));
    assert_eq!(controller.pending_frame(), None);
}

#[test]
fn logo_drives_theme() {
    let config = NoxConfig::default();
    let mut publisher = ThemePublisher::new(config.palette.clone(), BTreeMap::new());

    // Left half opaque red, right half transparent: transparent half is ignored.
    let mut logo = RgbaImage::new(128, 128);
    for (x, _, px) in logo.enumerate_pixels_mut() {
        *px = if x < 64 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 0])
        };
    }
    let palette = extract_palette(&DynamicImage::ImageRgba8(logo), &config.palette);
    let theme = publisher.apply_extracted(palette);
    let theme = theme.expect("red half yields a palette");
    assert_eq!(theme.primary.to_hex(), "#ff0000");
    assert_eq!(
        theme.accent,
        theme.primary.mix(Rgb::new(0xb6, 0x8c, 0xff), 0.35)
    );
    assert_eq!(
        publisher.sink().get("--bg-elev"),
        Some(&theme.primary.mix(Rgb::BLACK, 0.7).to_hex())
    );

    // A fully transparent logo leaves the published theme alone.
    let blank = DynamicImage::ImageRgba8(RgbaImage::new(64, 64));
    assert_eq!(
        publisher.apply_extracted(extract_palette(&blank, &config.palette)),
        None
    );
    assert_eq!(publisher.current(), Some(&theme));
}
