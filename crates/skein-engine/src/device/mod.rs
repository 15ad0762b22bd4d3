//! GPU device and surface ownership.
//!
//! This module wraps the wgpu bootstrap: adapter selection, device and
//! queue creation, surface configuration and per-frame texture
//! acquisition. Everything above it (targets, programs, draw passes)
//! borrows `Device`/`Queue` from here and never touches the surface
//! directly.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit};
pub use surface::SurfaceErrorAction;
