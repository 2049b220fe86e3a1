use egui::{Color32, Stroke};
use nox_protocol::{Rgb, Theme, ThemeToken};

pub fn rgb(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

pub fn resolve(token: ThemeToken, theme: &Theme) -> Color32 {
    rgb(theme.resolve(token))
}

// ── Typography scale ───────────────────────────────────────────────────────

pub const FONT_DISPLAY: f32 = 30.0;
pub const FONT_TITLE: f32 = 18.0;
pub const FONT_BODY: f32 = 13.0;
pub const FONT_CAPTION: f32 = 11.0;

// ── egui visual presets ────────────────────────────────────────────────────

/// Dark night-sky visuals tinted by the active theme.
pub fn nox_visuals(theme: &Theme) -> egui::Visuals {
    let bg = resolve(ThemeToken::Background, theme);
    let elev = resolve(ThemeToken::BackgroundElevated, theme);
    let primary = resolve(ThemeToken::Primary, theme);
    let accent = resolve(ThemeToken::Accent, theme);
    let text = resolve(ThemeToken::TextPrimary, theme);
    let muted = resolve(ThemeToken::TextMuted, theme);

    let mut v = egui::Visuals::dark();
    v.panel_fill = bg;
    v.window_fill = elev;
    v.extreme_bg_color = bg;
    v.faint_bg_color = elev;
    v.widgets.noninteractive.bg_fill = elev;
    v.widgets.noninteractive.fg_stroke = Stroke::new(1.0, muted);
    v.widgets.noninteractive.bg_stroke = Stroke::new(1.0, primary.gamma_multiply(0.4));
    v.widgets.inactive.bg_fill = elev;
    v.widgets.inactive.weak_bg_fill = elev;
    v.widgets.inactive.fg_stroke = Stroke::new(1.0, text);
    v.widgets.hovered.bg_fill = primary.gamma_multiply(0.6);
    v.widgets.hovered.weak_bg_fill = primary.gamma_multiply(0.6);
    v.widgets.hovered.fg_stroke = Stroke::new(1.0, text);
    v.widgets.active.bg_fill = primary;
    v.widgets.active.weak_bg_fill = primary;
    v.widgets.active.fg_stroke = Stroke::new(1.0, bg);
    v.selection.bg_fill = accent.gamma_multiply(0.35);
    v.selection.stroke = Stroke::new(1.0, accent);
    v.window_corner_radius = egui::CornerRadius::same(10);
    v.menu_corner_radius = egui::CornerRadius::same(10);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(8);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(8);
    v.widgets.active.corner_radius = egui::CornerRadius::same(8);
    v.hyperlink_color = accent;
    v
}

pub fn apply_typography(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::proportional(FONT_TITLE),
    );
    style
        .text_styles
        .insert(egui::TextStyle::Body, egui::FontId::proportional(FONT_BODY));
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::proportional(FONT_BODY),
    );
    style.text_styles.insert(
        egui::TextStyle::Small,
        egui::FontId::proportional(FONT_CAPTION),
    );
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_follow_theme() {
        let theme = Theme {
            primary: Rgb::new(1, 2, 3),
            ..Theme::default()
        };
        assert_eq!(resolve(ThemeToken::Primary, &theme), Color32::from_rgb(1, 2, 3));
        assert_eq!(resolve(ThemeToken::Star, &theme), Color32::WHITE);
    }

    #[test]
    fn visuals_use_elevated_background() {
        let theme = Theme::default();
        assert_eq!(nox_visuals(&theme).window_fill, rgb(theme.bg_elev));
    }
}
