use winit::window::{Window, WindowId};

use crate::device::Gpu;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window_id: WindowId,
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Drawable size in physical pixels.
    pub fn physical_size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.gpu.size()
    }

    /// Window scale factor (physical pixels per logical pixel).
    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}
