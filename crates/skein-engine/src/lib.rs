//! Skein engine crate.
//!
//! Layered GPU graph rendering: graph elements are grouped into
//! depth-ordered layers of packed attribute buffers, drawn through
//! pluggable geometry styles, with large edge sets time-sliced across
//! frames. This crate owns the rendering core plus the platform pieces
//! (wgpu device/surface, winit runtime, frame clock) hosts build on.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod geom;
pub mod color;
pub mod settings;
pub mod camera;

pub mod layer;
pub mod style;
pub mod program;
pub mod schedule;
pub mod targets;
pub mod labels;
pub mod renderer;
