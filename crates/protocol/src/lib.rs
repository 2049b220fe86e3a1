pub mod color;
pub mod commands;
pub mod theme;
pub mod types;

pub use color::{ColorParseError, Rgb};
pub use commands::RenderCommand;
pub use theme::{Theme, ThemeToken};
pub use types::{Color, Point, Rect, Viewport};
