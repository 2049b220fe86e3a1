use nox_protocol::{RenderCommand, Viewport};
use rand::Rng;

use crate::config::StarfieldConfig;
use crate::starfield::StarField;
use crate::surface::Surface;

/// Identifier of a pending frame request, as issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Host-side "call me on the next frame" facility (e.g. `requestAnimationFrame`).
///
/// The scheduler only records requests; the host later delivers the frame by
/// calling [`StarfieldController::tick`] with its timestamp.
pub trait FrameScheduler {
    /// Ask for one frame callback. `None` if the host refused.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What the host reports at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub viewport: Viewport,
    pub prefers_reduced_motion: bool,
}

/// Owns the star set, the drawing surface and the single pending frame
/// request for the background animation.
///
/// Lifecycle: [`start`](Self::start) → repeated [`tick`](Self::tick) driven by
/// the host → [`stop`](Self::stop). [`resize`](Self::resize) may arrive at any
/// time; it swaps the star set but never starts a second loop.
pub struct StarfieldController<S, F, R> {
    config: StarfieldConfig,
    surface: S,
    scheduler: F,
    rng: R,
    field: Option<StarField>,
    pending: Option<FrameHandle>,
    running: bool,
}

impl<S, F, R> StarfieldController<S, F, R>
where
    S: Surface,
    F: FrameScheduler,
    R: Rng,
{
    pub fn new(config: StarfieldConfig, surface: S, scheduler: F, rng: R) -> Self {
        Self {
            config,
            surface,
            scheduler,
            rng,
            field: None,
            pending: None,
            running: false,
        }
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn field(&self) -> Option<&StarField> {
        self.field.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Match the surface size to the viewport. No-op when already sized.
    pub fn configure(&mut self, viewport: Viewport) {
        if self.surface.viewport() != viewport {
            self.surface.resize(viewport);
        }
    }

    /// Begin the animation. Returns `false` (and touches nothing) when the
    /// host asks for reduced motion.
    pub fn start(&mut self, env: Environment) -> bool {
        if env.prefers_reduced_motion {
            tracing::debug!("reduced motion requested; starfield stays inert");
            return false;
        }
        self.configure(env.viewport);
        self.field = Some(StarField::generate(
            &self.config,
            env.viewport,
            &mut self.rng,
        ));
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.running = true;
        self.tick(0.0);
        true
    }

    /// Viewport changed: resize the surface and replace the star set.
    /// Ignored while the animation is not running.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.running {
            return;
        }
        self.configure(viewport);
        self.field = Some(StarField::generate(&self.config, viewport, &mut self.rng));
    }

    /// One frame: draw at `timestamp_ms`, then request the next frame.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if !self.running {
            return;
        }
        // The handle that brought us here has fired.
        self.pending = None;
        let commands = self.render(timestamp_ms);
        self.surface.draw(&commands);
        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            tracing::warn!("host refused a frame request; starfield halted");
            self.running = false;
        }
    }

    /// Cancel the pending frame and halt. The last drawn frame stays visible.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.running = false;
    }

    /// The commands for one frame without drawing them.
    pub fn render(&self, timestamp_ms: f64) -> Vec<RenderCommand> {
        match &self.field {
            Some(field) => field.render(&self.config, timestamp_ms),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        viewport: Viewport,
        resizes: usize,
        frames: Vec<Vec<RenderCommand>>,
    }

    impl Surface for RecordingSurface {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn resize(&mut self, viewport: Viewport) {
            self.viewport = viewport;
            self.resizes += 1;
        }

        fn draw(&mut self, commands: &[RenderCommand]) {
            self.frames.push(commands.to_vec());
        }
    }

    #[derive(Default)]
    struct CountingScheduler {
        next: i32,
        live: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
        refuse: bool,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refuse {
                return None;
            }
            self.next += 1;
            let handle = FrameHandle(self.next);
            self.live.push(handle);
            Some(handle)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.live.retain(|h| *h != handle);
            self.cancelled.push(handle);
        }
    }

    type Controller = StarfieldController<RecordingSurface, CountingScheduler, SmallRng>;

    fn controller() -> Controller {
        StarfieldController::new(
            StarfieldConfig::default(),
            RecordingSurface::default(),
            CountingScheduler::default(),
            SmallRng::seed_from_u64(42),
        )
    }

    fn env(width: u32, height: u32) -> Environment {
        Environment {
            viewport: Viewport::new(width, height),
            prefers_reduced_motion: false,
        }
    }

    #[test]
    fn reduced_motion_leaves_everything_untouched() {
        let mut c = controller();
        let started = c.start(Environment {
            viewport: Viewport::new(800, 600),
            prefers_reduced_motion: true,
        });
        assert!(!started);
        assert!(!c.is_running());
        assert!(c.field().is_none());
        assert_eq!(c.surface().resizes, 0);
        assert!(c.surface().frames.is_empty());
        assert_eq!(c.scheduler().next, 0);
    }

    #[test]
    fn start_sizes_generates_draws_and_schedules() {
        let mut c = controller();
        assert!(c.start(env(800, 600)));
        assert_eq!(c.surface().viewport, Viewport::new(800, 600));
        assert_eq!(c.field().map(StarField::len), Some(576));
        assert_eq!(c.surface().frames.len(), 1);
        assert_eq!(c.pending_frame(), Some(FrameHandle(1)));
    }

    #[test]
    fn restart_cancels_previous_request() {
        let mut c = controller();
        c.start(env(800, 600));
        c.start(env(800, 600));
        assert_eq!(c.scheduler().cancelled, vec![FrameHandle(1)]);
        assert_eq!(c.scheduler().live, vec![FrameHandle(2)]);
    }

    #[test]
    fn tick_keeps_exactly_one_request_alive() {
        let mut c = controller();
        c.start(env(400, 400));
        for t in [16.0, 32.0, 48.0] {
            // the host consumes the live request before invoking us
            let fired = c.scheduler.live.pop();
            assert!(fired.is_some());
            c.tick(t);
            assert_eq!(c.scheduler().live.len(), 1);
        }
        assert_eq!(c.surface().frames.len(), 4);
    }

    #[test]
    fn configure_is_idempotent() {
        let mut c = controller();
        c.configure(Viewport::new(320, 200));
        c.configure(Viewport::new(320, 200));
        assert_eq!(c.surface().resizes, 1);
        assert_eq!(c.surface().viewport(), Viewport::new(320, 200));
    }

    #[test]
    fn resize_replaces_stars_without_new_loop() {
        let mut c = controller();
        c.start(env(1000, 800));
        assert_eq!(c.field().map(StarField::len), Some(800));
        c.resize(Viewport::new(500, 400));
        assert_eq!(c.field().map(StarField::viewport), Some(Viewport::new(500, 400)));
        let expected = crate::starfield::star_count(c.config(), Viewport::new(500, 400));
        assert_eq!(c.field().map(StarField::len), Some(expected));
        assert_eq!(c.scheduler().live.len(), 1);
        assert_eq!(c.pending_frame(), Some(FrameHandle(1)));
    }

    #[test]
    fn resize_before_start_is_ignored() {
        let mut c = controller();
        c.resize(Viewport::new(500, 400));
        assert!(c.field().is_none());
        assert_eq!(c.surface().resizes, 0);
    }

    #[test]
    fn stop_cancels_and_ignores_late_ticks() {
        let mut c = controller();
        c.start(env(400, 400));
        c.stop();
        assert!(!c.is_running());
        assert!(c.scheduler().live.is_empty());
        c.tick(100.0);
        assert_eq!(c.surface().frames.len(), 1);
    }

    #[test]
    fn refused_request_halts_loop() {
        let mut c = controller();
        c.scheduler.refuse = true;
        c.start(env(400, 400));
        assert_eq!(c.surface().frames.len(), 1);
        assert!(!c.is_running());
        assert_eq!(c.pending_frame(), None);
    }
}
