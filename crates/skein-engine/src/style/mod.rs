//! Geometry styles: the pluggable seam between graph elements and GPU
//! passes.
//!
//! A style owns everything specific to one way of drawing an element
//! kind: how many vertices an element occupies ([`NodeStyle::points`]),
//! how many floats each vertex carries ([`NodeStyle::attributes`]), how
//! an element serializes into its slot (`encode_*`), optional index data
//! for indexed drawing (`compute_indices`), the pipeline for its shader
//! pair (`build_program`), per-pass uniform updates (`write_uniforms`)
//! and the draw call itself (`draw`).
//!
//! Encoding is pure CPU work and runs inside the layer builder; only
//! `build_program`, `write_uniforms` and `draw` touch wgpu. That split
//! keeps custom styles testable without a device.
//!
//! Built-ins: [`DiscNodes`], [`LineEdges`] (indexed) and [`ArrowEdges`],
//! the most involved of the three and the reference to copy when writing
//! a new style.

mod arrow;
mod common;
mod disc;
mod line;
mod registry;

use std::error::Error;
use std::fmt;

use skein_graph::{Edge, Node};

pub use arrow::ArrowEdges;
pub use disc::DiscNodes;
pub use line::LineEdges;
pub use registry::{RegistryError, StyleRegistry};

use crate::geom::Mat3;
use crate::layer::{AttributeBuffer, GpuGroup};
use crate::program::StyleProgram;
use crate::settings::Settings;

/// Per-pass parameters handed to `write_uniforms`.
///
/// `width`/`height` are the logical viewport size the matrix maps into;
/// `scale` is the backing-store multiplier (hidpi times oversampling)
/// for styles whose shaders work in device pixels.
#[derive(Debug, Clone, Copy)]
pub struct DrawParams<'a> {
    pub matrix: Mat3,
    pub width: f32,
    pub height: f32,
    /// Camera zoom ratio, graph units per logical pixel.
    pub ratio: f32,
    pub scale: f32,
    pub settings: &'a Settings,
}

/// Contiguous element range within one style group, in elements (not
/// vertices); styles translate to vertex or index ranges themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub first: usize,
    pub count: usize,
}

impl DrawRange {
    #[inline]
    pub const fn new(first: usize, count: usize) -> Self {
        Self { first, count }
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.first + self.count
    }
}

/// Failure to turn a style's shaders into a usable pipeline.
#[derive(Debug, Clone)]
pub struct ProgramError {
    pub style: String,
    pub reason: String,
}

impl ProgramError {
    pub fn new(style: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { style: style.into(), reason: reason.into() }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style '{}' failed to build its program: {}", self.style, self.reason)
    }
}

impl Error for ProgramError {}

/// Drawing contract for node styles.
pub trait NodeStyle: Send + Sync {
    /// Vertices per element. Constant for the lifetime of the style.
    fn points(&self) -> usize;

    /// Floats per vertex. Constant for the lifetime of the style.
    fn attributes(&self) -> usize;

    /// Serializes one node into `out`, which holds exactly
    /// `points() * attributes()` floats, pre-zeroed.
    fn encode_node(&self, node: &Node, out: &mut [f32], settings: &Settings);

    /// Index data for indexed styles; `None` draws non-indexed.
    fn compute_indices(&self, buffer: &AttributeBuffer) -> Option<Vec<u32>> {
        let _ = buffer;
        None
    }

    /// Builds the style's render pipeline against a target format.
    fn build_program(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<StyleProgram, ProgramError>;

    /// Refreshes the program's uniform block for the coming pass.
    fn write_uniforms(&self, queue: &wgpu::Queue, program: &StyleProgram, params: &DrawParams<'_>);

    /// Records the draw for `range` of `group` into an open pass,
    /// binding the program's pipeline and bind group itself.
    fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        program: &StyleProgram,
        group: &GpuGroup,
        range: DrawRange,
    );
}

/// Drawing contract for edge styles; mirrors [`NodeStyle`] but encodes
/// with both endpoints resolved.
pub trait EdgeStyle: Send + Sync {
    fn points(&self) -> usize;

    fn attributes(&self) -> usize;

    fn encode_edge(
        &self,
        edge: &Edge,
        source: &Node,
        target: &Node,
        out: &mut [f32],
        settings: &Settings,
    );

    fn compute_indices(&self, buffer: &AttributeBuffer) -> Option<Vec<u32>> {
        let _ = buffer;
        None
    }

    fn build_program(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<StyleProgram, ProgramError>;

    fn write_uniforms(&self, queue: &wgpu::Queue, program: &StyleProgram, params: &DrawParams<'_>);

    fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        program: &StyleProgram,
        group: &GpuGroup,
        range: DrawRange,
    );
}
