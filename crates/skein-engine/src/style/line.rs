//! Plain line edge style, drawn indexed.
//!
//! Four vertices per edge (the corners of a thick-line quad) and six
//! indices forming its two triangles. This is the style that exercises
//! the indexed half of the drawing contract; arrow edges stay
//! non-indexed because their nine vertices are already unshared.

use bytemuck::{Pod, Zeroable};
use skein_graph::{Edge, Node};

use crate::color::packed_channel;
use crate::layer::{AttributeBuffer, GpuGroup};
use crate::program::StyleProgram;
use crate::settings::Settings;
use crate::style::common::{self, ProgramDesc};
use crate::style::{DrawParams, DrawRange, EdgeStyle, ProgramError};

pub(crate) const POINTS: usize = 4;
pub(crate) const ATTRIBUTES: usize = 8;
const INDICES_PER_ELEMENT: usize = 6;

/// Vertex layout (32 bytes):
///
///  offset  0  position    [f32; 2]  loc 0
///  offset  8  other       [f32; 2]  loc 1
///  offset 16  half_width  f32       loc 2
///  offset 20  side        f32       loc 3  (+1 / -1)
///  offset 24  color       f32       loc 4
///  offset 28  alpha       f32       loc 5
const VERTEX_ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
    2 => Float32,
    3 => Float32,
    4 => Float32,
    5 => Float32
];

#[derive(Debug, Default)]
pub struct LineEdges;

impl LineEdges {
    pub fn new() -> Self {
        Self
    }
}

impl EdgeStyle for LineEdges {
    fn points(&self) -> usize {
        POINTS
    }

    fn attributes(&self) -> usize {
        ATTRIBUTES
    }

    fn encode_edge(
        &self,
        edge: &Edge,
        source: &Node,
        target: &Node,
        out: &mut [f32],
        settings: &Settings,
    ) {
        let half = edge.size / 2.0;
        let color = common::resolve_edge_color(edge, source, target, settings);
        let alpha = color.alpha_f32();
        let packed = packed_channel(color);

        // (own, other, side); sides flip per endpoint because the shader
        // derives its normal from own -> other, which reverses at the
        // target end.
        let rows: [(f32, f32, f32, f32, f32); POINTS] = [
            (source.x, source.y, target.x, target.y, 1.0),
            (source.x, source.y, target.x, target.y, -1.0),
            (target.x, target.y, source.x, source.y, 1.0),
            (target.x, target.y, source.x, source.y, -1.0),
        ];
        for (row, (x, y, ox, oy, side)) in rows.into_iter().enumerate() {
            let v = &mut out[row * ATTRIBUTES..(row + 1) * ATTRIBUTES];
            v[0] = x;
            v[1] = y;
            v[2] = ox;
            v[3] = oy;
            v[4] = half;
            v[5] = side;
            v[6] = packed;
            v[7] = alpha;
        }
    }

    fn compute_indices(&self, buffer: &AttributeBuffer) -> Option<Vec<u32>> {
        let mut indices = Vec::with_capacity(buffer.element_count() * INDICES_PER_ELEMENT);
        for element in 0..buffer.element_count() as u32 {
            let base = element * POINTS as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Some(indices)
    }

    fn build_program(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<StyleProgram, ProgramError> {
        common::build_style_program(
            device,
            format,
            &ProgramDesc {
                label: "line edge style",
                shader: include_str!("shaders/line.wgsl"),
                vertex_stride: (ATTRIBUTES * std::mem::size_of::<f32>()) as u64,
                attributes: &VERTEX_ATTRS,
                uniform_size: std::mem::size_of::<LineUniforms>() as u64,
            },
        )
    }

    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        program: &StyleProgram,
        params: &DrawParams<'_>,
    ) {
        let uniforms = LineUniforms {
            matrix: params.matrix.to_gpu(),
            resolution: [params.width, params.height],
            size_ratio: params.ratio / params.ratio.powf(params.settings.edges_pow_ratio),
            _pad: 0.0,
        };
        queue.write_buffer(&program.uniforms, 0, bytemuck::bytes_of(&uniforms));
    }

    fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        program: &StyleProgram,
        group: &GpuGroup,
        range: DrawRange,
    ) {
        let Some(index) = group.index.as_ref() else {
            // Upload skipped index data; nothing sane to draw.
            return;
        };
        pass.set_pipeline(&program.pipeline);
        pass.set_bind_group(0, &program.bind_group, &[]);
        pass.set_vertex_buffer(0, group.vertex.slice(..));
        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(
            (range.first * INDICES_PER_ELEMENT) as u32
                ..(range.end() * INDICES_PER_ELEMENT) as u32,
            0,
            0..1,
        );
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LineUniforms {
    matrix: [[f32; 4]; 3],
    resolution: [f32; 2],
    size_ratio: f32,
    _pad: f32,
}

#[cfg(test)]
mod tests {
    use skein_graph::Rgba;

    use super::*;

    #[test]
    fn encodes_a_quad_with_flipped_sides() {
        let style = LineEdges::new();
        let source = Node::new("s", 0.0, 0.0);
        let target = Node::new("t", 10.0, 0.0);
        let edge = Edge::new("e", "s", "t").with_size(3.0).with_color(Rgba::opaque(0, 255, 0));
        let mut out = vec![0.0; POINTS * ATTRIBUTES];
        style.encode_edge(&edge, &source, &target, &mut out, &Settings::default());

        let v = |row: usize| &out[row * ATTRIBUTES..(row + 1) * ATTRIBUTES];
        assert_eq!(&v(0)[0..4], &[0.0, 0.0, 10.0, 0.0]);
        assert_eq!(&v(2)[0..4], &[10.0, 0.0, 0.0, 0.0]);
        assert_eq!(v(0)[4], 1.5, "half width");
        assert_eq!(v(0)[5], 1.0);
        assert_eq!(v(1)[5], -1.0);
        assert_eq!(v(0)[6], 65280.0, "green packs to g * 256");
    }

    #[test]
    fn indices_tile_two_triangles_per_element() {
        let style = LineEdges::new();
        let buffer = AttributeBuffer::for_elements(2, POINTS, ATTRIBUTES);
        let indices = style.compute_indices(&buffer).expect("indexed style");
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn uniform_block_is_gpu_sized() {
        assert_eq!(std::mem::size_of::<LineUniforms>(), 64);
    }
}
