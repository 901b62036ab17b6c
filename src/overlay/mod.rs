pub mod asset;
pub mod canvas;
pub mod content;
pub mod model;
#[cfg(windows)]
pub mod platform;
pub mod scheduler;
pub mod service;
pub mod window;

pub use canvas::{DoubleBufferedCanvas, DrawContext, PaintHandler, Surface};
pub use content::{AnchorPolicy, ContentProvider, PointerSource, DEFAULT_LABEL};
pub use scheduler::{IdleScheduler, IdleTarget, RateMeter};
pub use service::spawn_overlay;
pub use window::{ExStyle, OverlayWindow, WindowBackend, WindowStyles};
