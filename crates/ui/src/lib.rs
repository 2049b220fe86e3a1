mod app;
mod renderer;
mod store;
mod theme;

pub use app::{AppOptions, NoxApp, RepaintScheduler};
pub use store::FileStore;
