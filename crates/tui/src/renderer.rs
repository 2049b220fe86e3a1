use std::io::{Stdout, stdout};
use std::ops::Range;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use nox_core::starfield::{Environment, FrameHandle, FrameScheduler, StarfieldController};
use nox_core::surface::CommandBuffer;
use nox_core::{StarField, StarfieldConfig};
use nox_protocol::{RenderCommand, Rgb, Theme, ThemeToken, Viewport};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Block,
};

/// Logical pixels covered by one terminal cell.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Logical pixel size of a cell area.
pub fn logical_viewport(area: Rect) -> Viewport {
    Viewport::new(
        (f64::from(area.width) * CELL_WIDTH) as u32,
        (f64::from(area.height) * CELL_HEIGHT) as u32,
    )
}

fn glyph(radius: f64) -> char {
    if radius >= 1.2 {
        '✦'
    } else if radius >= 0.7 {
        '+'
    } else {
        '·'
    }
}

/// Cells whose span overlaps `[lo, lo + len)`, clipped to `0..max`.
fn cells(lo: f64, len: f64, cell: f64, max: u16) -> Range<u16> {
    let clip = |v: f64| v.max(0.0).min(f64::from(max)) as u16;
    clip((lo / cell).floor())..clip(((lo + len) / cell).ceil())
}

/// Paint starfield commands into `area`. Star brightness is the command's
/// alpha blended toward the theme background.
///
/// Returns how many stars landed inside the area.
pub fn paint(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], theme: &Theme) -> usize {
    let bg = theme.resolve(ThemeToken::Background);
    let mut painted = 0;
    for cmd in commands {
        match cmd {
            RenderCommand::Clear { rect } => {
                for row in cells(rect.y, rect.h, CELL_HEIGHT, area.height) {
                    for col in cells(rect.x, rect.w, CELL_WIDTH, area.width) {
                        buf[(area.x + col, area.y + row)]
                            .set_char(' ')
                            .set_bg(to_color(bg));
                    }
                }
            }
            RenderCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                let col = (center.x / CELL_WIDTH).floor();
                let row = (center.y / CELL_HEIGHT).floor();
                if col < 0.0 || row < 0.0 {
                    continue;
                }
                let (col, row) = (col as u16, row as u16);
                if col >= area.width || row >= area.height {
                    continue;
                }
                let [r, g, b, a] = color.to_rgba8();
                let fg = bg.mix(Rgb::new(r, g, b), f64::from(a) / 255.0);
                buf[(area.x + col, area.y + row)]
                    .set_char(glyph(*radius))
                    .set_fg(to_color(fg))
                    .set_bg(to_color(bg));
                painted += 1;
            }
        }
    }
    painted
}

/// Frame requests become due on the next pass of the event loop.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next: i32,
    due: Option<FrameHandle>,
}

impl TickScheduler {
    pub fn take_due(&mut self) -> bool {
        self.due.take().is_some()
    }
}

impl FrameScheduler for TickScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next = self.next.wrapping_add(1);
        self.due = Some(FrameHandle(self.next));
        self.due
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.due == Some(handle) {
            self.due = None;
        }
    }
}

fn sky_area(full: Rect) -> Rect {
    Rect::new(full.x, full.y + 1, full.width, full.height.saturating_sub(1))
}

type Sky = StarfieldController<CommandBuffer, TickScheduler, SmallRng>;

fn live_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: StarfieldConfig,
    reduced_motion: bool,
) -> Result<()> {
    let size = terminal.size()?;
    let mut sky: Sky = StarfieldController::new(
        config,
        CommandBuffer::default(),
        TickScheduler::default(),
        SmallRng::from_rng(&mut rand::rng()),
    );
    let animating = sky.start(Environment {
        viewport: logical_viewport(sky_area(Rect::new(0, 0, size.width, size.height))),
        prefers_reduced_motion: reduced_motion,
    });
    tracing::info!(animating, "terminal starfield started");

    let theme = Theme::default();
    let started = Instant::now();
    loop {
        if sky.scheduler_mut().take_due() {
            sky.tick(started.elapsed().as_secs_f64() * 1000.0);
        }

        terminal.draw(|frame| {
            let full = frame.area();
            let title = if animating {
                let stars = sky.field().map_or(0, StarField::len);
                format!(" Nox ✦ {stars} estrelas | q sair ")
            } else {
                " Nox ✦ movimento reduzido | q sair ".to_string()
            };
            let header = Block::default().title(title).style(
                Style::default()
                    .fg(to_color(theme.resolve(ThemeToken::TextPrimary)))
                    .bg(to_color(theme.bg_elev)),
            );
            frame.render_widget(header, Rect::new(0, 0, full.width, full.height.min(1)));

            let area = sky_area(full);
            let background = Block::default().style(Style::default().bg(to_color(
                theme.resolve(ThemeToken::Background),
            )));
            frame.render_widget(background, area);
            paint(frame.buffer_mut(), area, sky.surface().frame(), &theme);
        })?;

        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                }
                Event::Resize(width, height) => {
                    sky.resize(logical_viewport(sky_area(Rect::new(0, 0, width, height))));
                }
                _ => {}
            }
        }
    }

    sky.stop();
    Ok(())
}

/// Animate the starfield until `q` or Esc. The terminal is restored even when
/// the loop fails.
pub fn run_live(config: StarfieldConfig, reduced_motion: bool) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;

    let result = live_loop(&mut terminal, config, reduced_motion);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
