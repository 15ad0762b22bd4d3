//! Depth-layer construction.
//!
//! The layer builder turns a graph snapshot into an ordered list of
//! drawable layers. Elements are sorted by depth (descending, deepest
//! first), then by category (edges ahead of nodes within a depth tier),
//! then by resolved style name; consecutive runs with equal depth and
//! category form a [`Layer`], and within each layer the per-style runs
//! become [`StyleGroup`]s carrying a packed attribute buffer ready for
//! upload.
//!
//! Buffers are sized for every member of their group, visible or not;
//! hidden members keep zero-filled slots so that indices stay aligned
//! with the source arrays and a later visibility flip does not move
//! neighbors around.

mod buffer;
mod build;
mod sort;
mod upload;

pub use buffer::AttributeBuffer;
pub use build::{Layer, LayerSet, StyleGroup};
pub use sort::{Category, SortKey};
pub use upload::{GpuGroup, GpuLayerSet};
