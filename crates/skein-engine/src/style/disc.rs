//! Disc node style.
//!
//! Three vertices per node, each carrying the node center plus the angle
//! of its corner on a triangle circumscribing the disc (circumradius is
//! twice the node radius). The fragment stage rounds the triangle into
//! an antialiased disc.

use bytemuck::{Pod, Zeroable};
use skein_graph::Node;

use crate::color::packed_channel;
use crate::layer::GpuGroup;
use crate::program::StyleProgram;
use crate::settings::Settings;
use crate::style::common::{self, ProgramDesc};
use crate::style::{DrawParams, DrawRange, NodeStyle, ProgramError};

pub(crate) const POINTS: usize = 3;
pub(crate) const ATTRIBUTES: usize = 6;

/// Vertex layout (24 bytes):
///
///  offset  0  position  [f32; 2]  loc 0
///  offset  8  size      f32       loc 1
///  offset 12  angle     f32       loc 2
///  offset 16  color     f32       loc 3
///  offset 20  alpha     f32       loc 4
const VERTEX_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32,
    2 => Float32,
    3 => Float32,
    4 => Float32
];

#[derive(Debug, Default)]
pub struct DiscNodes;

impl DiscNodes {
    pub fn new() -> Self {
        Self
    }
}

impl NodeStyle for DiscNodes {
    fn points(&self) -> usize {
        POINTS
    }

    fn attributes(&self) -> usize {
        ATTRIBUTES
    }

    fn encode_node(&self, node: &Node, out: &mut [f32], settings: &Settings) {
        let color = node.color.unwrap_or(settings.default_node_color);
        let alpha = color.alpha_f32();
        let packed = packed_channel(color);

        for corner in 0..POINTS {
            let v = &mut out[corner * ATTRIBUTES..(corner + 1) * ATTRIBUTES];
            v[0] = node.x;
            v[1] = node.y;
            v[2] = node.size;
            v[3] = corner as f32 * std::f32::consts::TAU / 3.0;
            v[4] = packed;
            v[5] = alpha;
        }
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
                label: "disc node style",
                shader: include_str!("shaders/disc.wgsl"),
                vertex_stride: (ATTRIBUTES * std::mem::size_of::<f32>()) as u64,
                attributes: &VERTEX_ATTRS,
                uniform_size: std::mem::size_of::<DiscUniforms>() as u64,
            },
        )
    }

    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        program: &StyleProgram,
        params: &DrawParams<'_>,
    ) {
        let uniforms = DiscUniforms {
            matrix: params.matrix.to_gpu(),
            resolution: [params.width, params.height],
            size_ratio: params.ratio / params.ratio.powf(params.settings.nodes_pow_ratio),
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
        pass.set_pipeline(&program.pipeline);
        pass.set_bind_group(0, &program.bind_group, &[]);
        pass.set_vertex_buffer(0, group.vertex.slice(..));
        pass.draw((range.first * POINTS) as u32..(range.end() * POINTS) as u32, 0..1);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DiscUniforms {
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
    fn encodes_three_fanned_corners() {
        let style = DiscNodes::new();
        let node = Node::new("n", 3.0, -4.0).with_size(7.0).with_color(Rgba::opaque(0, 0, 255));
        let mut out = vec![0.0; POINTS * ATTRIBUTES];
        style.encode_node(&node, &mut out, &Settings::default());

        for corner in 0..POINTS {
            let v = &out[corner * ATTRIBUTES..(corner + 1) * ATTRIBUTES];
            assert_eq!(&v[0..3], &[3.0, -4.0, 7.0]);
            let expected_angle = corner as f32 * std::f32::consts::TAU / 3.0;
            assert!((v[3] - expected_angle).abs() < 1e-6);
            assert_eq!(v[4], 255.0);
            assert_eq!(v[5], 1.0);
        }
    }

    #[test]
    fn colorless_nodes_take_the_default() {
        let style = DiscNodes::new();
        let node = Node::new("n", 0.0, 0.0);
        let mut settings = Settings::default();
        settings.default_node_color = Rgba::opaque(1, 0, 0);
        let mut out = vec![0.0; POINTS * ATTRIBUTES];
        style.encode_node(&node, &mut out, &settings);
        assert_eq!(out[4], 65536.0);
    }

    #[test]
    fn uniform_block_is_gpu_sized() {
        assert_eq!(std::mem::size_of::<DiscUniforms>(), 64);
    }
}
