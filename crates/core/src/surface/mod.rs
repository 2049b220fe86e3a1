pub mod raster;

use nox_protocol::{RenderCommand, Viewport};

pub use raster::RasterSurface;

/// An addressable 2D pixel area that can execute [`RenderCommand`]s.
///
/// Drawing is infallible from the caller's point of view: surfaces skip
/// commands they cannot honour.
pub trait Surface {
    fn viewport(&self) -> Viewport;
    /// Set the pixel size. Implementations may discard the current contents.
    fn resize(&mut self, viewport: Viewport);
    fn draw(&mut self, commands: &[RenderCommand]);
}

/// Keeps the most recent frame's commands for a host that paints them
/// itself later (immediate-mode UIs, terminals).
#[derive(Debug, Default, Clone)]
pub struct CommandBuffer {
    viewport: Viewport,
    frame: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn frame(&self) -> &[RenderCommand] {
        &self.frame
    }

    pub fn clear(&mut self) {
        self.frame.clear();
    }
}

impl Surface for CommandBuffer {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.frame.clear();
    }

    fn draw(&mut self, commands: &[RenderCommand]) {
        self.frame.clear();
        self.frame.extend_from_slice(commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_buffer_keeps_only_last_frame() {
        let mut buf = CommandBuffer::default();
        buf.resize(Viewport::new(4, 4));
        let clear = RenderCommand::Clear {
            rect: Viewport::new(4, 4).bounds(),
        };
        buf.draw(&[clear.clone(), clear.clone()]);
        buf.draw(std::slice::from_ref(&clear));
        assert_eq!(buf.frame(), &[clear]);
        buf.resize(Viewport::new(8, 8));
        assert!(buf.frame().is_empty());
        assert_eq!(buf.viewport(), Viewport::new(8, 8));
    }
}
