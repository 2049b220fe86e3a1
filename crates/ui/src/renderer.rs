use egui::{Color32, CornerRadius, Painter, Pos2, Rect};
use nox_protocol::{Color, RenderCommand};

/// Circles smaller than this cover no visible area.
const MIN_RADIUS: f32 = 0.05;

pub fn color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Paint `commands` with their origin at `origin`. `Clear` fills with
/// `background`, since an egui layer has nothing underneath to reveal.
///
/// Returns how many circles were painted after culling.
pub fn render_commands(
    painter: &Painter,
    commands: &[RenderCommand],
    origin: Pos2,
    background: Color32,
) -> usize {
    let clip = painter.clip_rect();
    let mut painted = 0;
    for cmd in commands {
        match cmd {
            RenderCommand::Clear { rect } => {
                let min = origin + egui::vec2(rect.x as f32, rect.y as f32);
                let r = Rect::from_min_size(min, egui::vec2(rect.w as f32, rect.h as f32));
                painter.rect_filled(r, CornerRadius::ZERO, background);
            }
            RenderCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                let radius = *radius as f32;
                if radius < MIN_RADIUS {
                    continue;
                }
                let c = origin + egui::vec2(center.x as f32, center.y as f32);
                // Cull off-screen
                if !clip.expand(radius).contains(c) {
                    continue;
                }
                painter.circle_filled(c, radius, color32(*color));
                painted += 1;
            }
        }
    }
    painted
}
