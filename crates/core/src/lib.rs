pub mod config;
pub mod curiosities;
pub mod menu;
pub mod palette;
pub mod session;
pub mod starfield;
pub mod surface;
pub mod theme;

pub use config::{ConfigError, NoxConfig, PaletteConfig, StarfieldConfig};
pub use palette::Palette;
pub use starfield::{Star, StarField};
