//! Core contracts between the window runtime and hosts.
//!
//! A host implements [`App`] and hands it to the runtime; the runtime
//! owns the platform loop and calls back with raw window events and one
//! [`FrameCtx`] per redraw. Nothing here interprets input; hosts read
//! the winit events they care about directly.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
