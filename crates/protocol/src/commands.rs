use serde::{Deserialize, Serialize};

use crate::types::{Color, Point, Rect};

/// A single, stateless drawing instruction.
///
/// Core views emit a `Vec<RenderCommand>` per frame. Surfaces consume the
/// list in order; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Reset every pixel inside `rect` to fully transparent.
    Clear { rect: Rect },

    /// Fill a circle. `color.a` is the fill opacity in `[0, 1]`.
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
}
