use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use nox_core::StarfieldConfig;
use nox_core::starfield::{Environment, FrameHandle, FrameScheduler, StarfieldController};
use nox_core::surface::Surface;
use nox_protocol::{RenderCommand, Viewport};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::dom;

const CANVAS_ID: &str = "starfield";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type FrameCallback = Closure<dyn FnMut(f64)>;
type CallbackSlot = Rc<RefCell<Option<FrameCallback>>>;
type CanvasController = StarfieldController<CanvasSurface, RafScheduler, SmallRng>;

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    Ok(canvas
        .get_context("2d")?
        .ok_or("canvas has no 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()?)
}

/// `<canvas>` backed surface.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
    }

    fn draw(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::Clear { rect } => {
                    self.ctx.clear_rect(rect.x, rect.y, rect.w, rect.h);
                }
                RenderCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => {
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx.begin_path();
                    if let Err(e) = self.ctx.arc(center.x, center.y, *radius, 0.0, TAU) {
                        dom::report(&e);
                        continue;
                    }
                    self.ctx.fill();
                }
            }
        }
    }
}

/// `requestAnimationFrame` scheduler. Every request reuses the one frame
/// callback stored in `callback`.
pub struct RafScheduler {
    window: Window,
    callback: CallbackSlot,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let slot = self.callback.borrow();
        let callback = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                dom::report(&e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            dom::report(&e);
        }
    }
}

/// Animated background owned by the page.
pub struct Starfield {
    controller: Rc<RefCell<CanvasController>>,
    _callback: CallbackSlot,
}

impl Starfield {
    /// Wire `#starfield` to the frame loop. `Ok(None)` when the page has no
    /// canvas.
    pub fn mount(
        window: &Window,
        document: &Document,
        config: StarfieldConfig,
    ) -> Result<Option<Self>, JsValue> {
        let Some(canvas) = dom::by_id::<HtmlCanvasElement>(document, CANVAS_ID) else {
            return Ok(None);
        };
        let surface = CanvasSurface::new(canvas)?;
        let slot: CallbackSlot = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler {
            window: window.clone(),
            callback: Rc::clone(&slot),
        };
        let rng = SmallRng::seed_from_u64(js_sys::Math::random().to_bits());
        let controller = Rc::new(RefCell::new(StarfieldController::new(
            config, surface, scheduler, rng,
        )));

        // Weak: the controller owns the scheduler, which owns this closure.
        let weak = Rc::downgrade(&controller);
        *slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            if let Ok(mut controller) = controller.try_borrow_mut() {
                controller.tick(timestamp);
            }
        }));

        let env = Environment {
            viewport: dom::viewport(window),
            prefers_reduced_motion: dom::media_matches(window, REDUCED_MOTION_QUERY),
        };
        if !controller.borrow_mut().start(env) {
            web_sys::console::info_1(&JsValue::from_str("starfield: reduced motion, not animating"));
        }

        let weak = Rc::downgrade(&controller);
        let win = window.clone();
        dom::listen(window, "resize", move |_| {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().resize(dom::viewport(&win));
            }
        })?;

        Ok(Some(Self {
            controller,
            _callback: slot,
        }))
    }

    pub fn is_running(&self) -> bool {
        self.controller.borrow().is_running()
    }

    pub fn stop(&self) {
        self.controller.borrow_mut().stop();
    }
}
