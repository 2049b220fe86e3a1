//! Property tests for star generation and the twinkle formula.

use nox_core::StarfieldConfig;
use nox_core::starfield::{Star, StarField, star_count};
use nox_protocol::{RenderCommand, Viewport};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn expected_count(width: u32, height: u32) -> usize {
    let density = if width >= 900 { 0.0018 } else { 0.0012 };
    let wanted = (f64::from(width) * f64::from(height) * density).floor() as usize;
    wanted.min(800)
}

proptest! {
    #[test]
    fn count_and_bounds(width in 1u32..2500, height in 1u32..1600, seed in any::<u64>()) {
        let config = StarfieldConfig::default();
        let vp = Viewport::new(width, height);
        let field = StarField::generate(&config, vp, &mut SmallRng::seed_from_u64(seed));

        prop_assert_eq!(field.len(), expected_count(width, height));
        prop_assert_eq!(star_count(&config, vp), expected_count(width, height));
        for s in field.stars() {
            prop_assert!(s.x >= 0.0 && s.x < f64::from(width));
            prop_assert!(s.y >= 0.0 && s.y < f64::from(height));
            prop_assert!(s.z >= 0.2 && s.z < 1.0);
            prop_assert!(s.tw >= 0.2 && s.tw < 0.8);
        }
    }

    #[test]
    fn alpha_is_pure_and_matches_formula(
        x in 0.0f64..4000.0,
        tw in 0.2f64..0.8,
        t in 0.0f64..1.0e7,
    ) {
        let config = StarfieldConfig::default();
        let star = Star { x, y: 0.0, z: 0.5, tw };
        let a = star.alpha(&config, t);
        prop_assert_eq!(a, star.alpha(&config, t));
        prop_assert_eq!(a, 0.6 + 0.25 * ((t / 800.0) * tw + x).sin());
        prop_assert!((0.35..=0.85).contains(&a));
    }

    #[test]
    fn frames_are_reproducible(seed in any::<u64>(), t in 0.0f64..1.0e6) {
        let config = StarfieldConfig::default();
        let field = StarField::generate(
            &config,
            Viewport::new(320, 240),
            &mut SmallRng::seed_from_u64(seed),
        );
        let a = field.render(&config, t);
        let b = field.render(&config, t);
        prop_assert_eq!(&a, &b);
        let circles = a
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillCircle { .. }))
            .count();
        prop_assert_eq!(circles, field.len());
    }
}
