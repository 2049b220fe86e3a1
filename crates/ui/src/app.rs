use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use eframe::egui;
use nox_core::NoxConfig;
use nox_core::curiosities::CuriosityGrid;
use nox_core::menu::RadialMenu;
use nox_core::palette::extract_palette;
use nox_core::session::{INVALID_MESSAGE, LoginError, SessionManager, WELCOME_MESSAGE};
use nox_core::starfield::{Environment, FrameHandle, FrameScheduler, StarfieldController};
use nox_core::surface::{CommandBuffer, Surface};
use nox_core::theme::ThemePublisher;
use nox_protocol::{Theme, ThemeToken, Viewport};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::renderer;
use crate::store::FileStore;
use crate::theme;

/// Frames arrive as egui repaints; a request marks the next repaint as due.
pub struct RepaintScheduler {
    ctx: egui::Context,
    next: i32,
    due: Option<FrameHandle>,
}

impl RepaintScheduler {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next: 0,
            due: None,
        }
    }

    fn take_due(&mut self) -> bool {
        self.due.take().is_some()
    }
}

impl FrameScheduler for RepaintScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next = self.next.wrapping_add(1);
        let handle = FrameHandle(self.next);
        self.due = Some(handle);
        self.ctx.request_repaint();
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.due == Some(handle) {
            self.due = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Home,
    Curiosities,
    Login,
}

impl Section {
    const ALL: [Section; 3] = [Section::Home, Section::Curiosities, Section::Login];

    fn label(self) -> &'static str {
        match self {
            Section::Home => "Início",
            Section::Curiosities => "Curiosidades",
            Section::Login => "Entrar",
        }
    }
}

/// Startup options, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub config: NoxConfig,
    pub reduced_motion: bool,
    /// Where the session record lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

type Starfield = StarfieldController<CommandBuffer, RepaintScheduler, SmallRng>;

pub struct NoxApp {
    starfield: Starfield,
    started: bool,
    reduced_motion: bool,

    publisher: ThemePublisher<BTreeMap<String, String>>,
    logo: Option<egui::TextureHandle>,

    session: SessionManager<FileStore>,
    email: String,
    password: String,
    status_line: String,
    logout_visible: bool,

    menu: RadialMenu,
    /// Area of the navigation bar last frame; clicks outside close the menu.
    nav_rect: Option<egui::Rect>,
    scroll_to: Option<Section>,

    grid: CuriosityGrid,
    error: Option<String>,
}

impl NoxApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: AppOptions) -> Self {
        cc.egui_ctx.set_visuals(theme::nox_visuals(&Theme::default()));
        theme::apply_typography(&cc.egui_ctx);

        let store = options
            .data_dir
            .map_or_else(FileStore::default_location, FileStore::new);
        tracing::debug!(dir = %store.dir().display(), "session store");

        let starfield = StarfieldController::new(
            options.config.starfield,
            CommandBuffer::default(),
            RepaintScheduler::new(cc.egui_ctx.clone()),
            SmallRng::from_rng(&mut rand::rng()),
        );

        let mut app = Self {
            starfield,
            started: false,
            reduced_motion: options.reduced_motion,
            publisher: ThemePublisher::new(options.config.palette, BTreeMap::new()),
            logo: None,
            session: SessionManager::new(store),
            email: String::new(),
            password: String::new(),
            status_line: String::new(),
            logout_visible: false,
            menu: RadialMenu::default(),
            nav_rect: None,
            scroll_to: None,
            grid: CuriosityGrid::default(),
            error: None,
        };
        app.refresh_session();
        app
    }

    fn theme(&self) -> Theme {
        self.publisher.current().copied().unwrap_or_default()
    }

    fn refresh_session(&mut self) {
        let status = self.session.status();
        self.status_line = status.message;
        self.logout_visible = status.logout_visible;
    }

    fn submit_login(&mut self) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        match self.session.login(&self.email, &self.password, now_ms) {
            Ok(_) => {
                self.password.clear();
                self.refresh_session();
                self.status_line = WELCOME_MESSAGE.to_string();
            }
            Err(LoginError::InvalidCredentials) => {
                self.status_line = INVALID_MESSAGE.to_string();
            }
            Err(e) => {
                tracing::error!(error = %e, "could not store session");
                self.error = Some(e.to_string());
            }
        }
    }

    fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            tracing::error!(error = %e, "could not clear session");
            self.error = Some(e.to_string());
        }
        self.refresh_session();
    }

    fn open_logo(&mut self, ctx: &egui::Context, path: &Path) {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open logo");
                self.error = Some(format!("Não foi possível abrir o logo: {e}"));
                return;
            }
        };
        let palette = extract_palette(&image, self.publisher.config());
        if let Some(theme) = self.publisher.apply_extracted(palette) {
            ctx.set_visuals(theme::nox_visuals(&theme));
        }

        let rgba = image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.logo = Some(ctx.load_texture("logo", pixels, egui::TextureOptions::LINEAR));
        self.error = None;
    }

    fn set_reduced_motion(&mut self, reduced: bool, viewport: Viewport) {
        self.reduced_motion = reduced;
        if reduced {
            self.starfield.stop();
            self.starfield.surface_mut().clear();
        } else {
            self.starfield.start(Environment {
                viewport,
                prefers_reduced_motion: false,
            });
        }
    }

    fn drive_starfield(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let viewport = Viewport::new(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);
        if !self.started {
            self.started = true;
            self.starfield.start(Environment {
                viewport,
                prefers_reduced_motion: self.reduced_motion,
            });
            return;
        }
        if self.starfield.surface().viewport() != viewport {
            self.starfield.resize(viewport);
        }
        if self.starfield.scheduler_mut().take_due() {
            let now_ms = ctx.input(|i| i.time) * 1000.0;
            self.starfield.tick(now_ms);
        }
    }

    fn handle_menu_input(&mut self, ctx: &egui::Context) {
        let (escape, click) = ctx.input(|i| {
            let click = if i.pointer.any_click() {
                i.pointer.interact_pos()
            } else {
                None
            };
            (i.key_pressed(egui::Key::Escape), click)
        });
        if escape {
            self.menu.on_key("Escape");
        }
        if let Some(pos) = click {
            let inside = self.nav_rect.is_some_and(|r| r.contains(pos));
            self.menu.on_click(inside);
        }
    }

    fn nav_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let theme = self.theme();
        let bar = ui.horizontal(|ui| {
            if let Some(logo) = &self.logo {
                ui.image((logo.id(), egui::vec2(32.0, 32.0)));
            } else {
                ui.label(
                    egui::RichText::new("✦ Nox")
                        .size(theme::FONT_TITLE)
                        .color(theme::resolve(ThemeToken::Primary, &theme)),
                );
            }
            ui.separator();

            let toggle = ui
                .selectable_label(self.menu.is_open(), "☰ Menu")
                .on_hover_text(format!("aria-expanded={}", self.menu.aria_expanded()));
            if toggle.clicked() {
                self.menu.toggle();
            }
            if self.menu.is_open() {
                for section in Section::ALL {
                    if ui.button(section.label()).clicked() {
                        self.menu.on_navigate();
                        self.scroll_to = Some(section);
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut reduced = self.reduced_motion;
                if ui.checkbox(&mut reduced, "Reduzir movimento").changed() {
                    let viewport = self.starfield.surface().viewport();
                    self.set_reduced_motion(reduced, viewport);
                }
                if ui.button("Carregar logo").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Imagem", &["png", "jpg", "jpeg", "webp"])
                        .pick_file()
                    {
                        self.open_logo(ctx, &path);
                    }
                }
            });
        });
        self.nav_rect = Some(bar.response.rect);
    }

    fn section_heading(&mut self, ui: &mut egui::Ui, section: Section, title: &str) {
        let heading = ui.heading(title);
        if self.scroll_to == Some(section) {
            heading.scroll_to_me(Some(egui::Align::Min));
            self.scroll_to = None;
        }
    }

    fn hero(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        self.section_heading(ui, Section::Home, "Nox");
        ui.label(
            egui::RichText::new("Astrologia sob o céu noturno.")
                .size(theme::FONT_DISPLAY)
                .color(theme::resolve(ThemeToken::TextPrimary, theme)),
        );
        ui.add_space(8.0);
        egui::CollapsingHeader::new("Variáveis do tema")
            .default_open(false)
            .show(ui, |ui| {
                let vars = self.publisher.sink();
                if vars.is_empty() {
                    ui.weak("Carregue um logo para gerar o tema.");
                }
                for (name, value) in vars {
                    ui.monospace(format!("{name}: {value}"));
                }
            });
    }

    fn curiosities(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        self.section_heading(ui, Section::Curiosities, "Curiosidades");
        let fill = theme::resolve(ThemeToken::BackgroundElevated, theme);
        let cards: Vec<_> = self.grid.cards().collect();
        let grid = &mut self.grid;
        ui.horizontal_wrapped(|ui| {
            for (index, card) in cards.into_iter().enumerate() {
                let frame = egui::Frame::group(ui.style())
                    .fill(fill)
                    .inner_margin(egui::Margin::same(12))
                    .corner_radius(egui::CornerRadius::same(10));
                let response = frame
                    .show(ui, |ui| {
                        ui.set_width(220.0);
                        ui.strong(card.question);
                        if card.revealed {
                            ui.label(card.text);
                        } else {
                            ui.weak(card.text);
                        }
                    })
                    .response
                    .interact(egui::Sense::click());

                if response.clicked() {
                    grid.reveal(index);
                } else if response.has_focus() {
                    let key = ui.input(|i| {
                        if i.key_pressed(egui::Key::Enter) {
                            Some("Enter")
                        } else if i.key_pressed(egui::Key::Space) {
                            Some(" ")
                        } else {
                            None
                        }
                    });
                    if let Some(key) = key {
                        grid.on_key(index, key);
                    }
                }
            }
        });
    }

    fn login(&mut self, ui: &mut egui::Ui) {
        self.section_heading(ui, Section::Login, "Entrar");
        ui.add(egui::TextEdit::singleline(&mut self.email).hint_text("email"));
        let password = ui.add(
            egui::TextEdit::singleline(&mut self.password)
                .password(true)
                .hint_text("senha"),
        );
        let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Entrar").clicked() || submitted {
            self.submit_login();
        }
        if !self.status_line.is_empty() {
            ui.label(&self.status_line);
        }
        if self.logout_visible && ui.button("Sair").clicked() {
            self.logout();
        }
    }
}

impl eframe::App for NoxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_menu_input(ctx);
        let theme = self.theme();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            self.nav_bar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.weak(format!("© {} Nox", chrono::Local::now().year()));
                if let Some(err) = &self.error {
                    ui.separator();
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            self.drive_starfield(ctx, rect);
            let background = theme::resolve(ThemeToken::Background, &theme);
            renderer::render_commands(
                ui.painter(),
                self.starfield.surface().frame(),
                rect.min,
                background,
            );

            egui::ScrollArea::vertical().show(ui, |ui| {
                self.hero(ui, &theme);
                ui.add_space(24.0);
                self.curiosities(ui, &theme);
                ui.add_space(24.0);
                self.login(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repaint_scheduler_tracks_one_due_frame() {
        let mut scheduler = RepaintScheduler::new(egui::Context::default());
        let first = scheduler.request_frame().unwrap();
        let second = scheduler.request_frame().unwrap();
        assert_ne!(first, second);
        scheduler.cancel_frame(first);
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());
    }
}
