//! Arrowed edge style, the richest of the built-ins and the reference
//! for writing custom styles.
//!
//! Each edge occupies nine vertices: six form the two body triangles of
//! a thick line, three form an oversized head triangle whose silhouette
//! (pointed arrow or inhibitory bar) is carved out in the fragment
//! stage using one-hot barycentric coordinates. The whole shape lives in
//! graph space; the vertex shader fans vertices out from the two
//! endpoints using per-vertex flags rather than CPU-side trigonometry,
//! which keeps the encoder a plain copy of per-edge scalars:
//!
//! - `delay` pulls target-end vertices back along the edge so the head
//!   tip lands on the target's rim instead of under it, honoring the
//!   target's shape-adjusted radius.
//! - `minus` picks which side of the edge a body vertex fans to.
//! - `head`/`head_position` switch a vertex into head mode and select
//!   its corner (-1, 0 tip, 1).
//! - `tan_angle` shears the end caps for fanned parallel edges, with the
//!   implied rescale so thickness is preserved.

use bytemuck::{Pod, Zeroable};
use skein_graph::{Edge, Node};

use crate::color::packed_channel;
use crate::geom::Vec2;
use crate::layer::GpuGroup;
use crate::program::StyleProgram;
use crate::settings::Settings;
use crate::style::common::{self, ProgramDesc};
use crate::style::{DrawParams, DrawRange, EdgeStyle, ProgramError};

pub(crate) const POINTS: usize = 9;
pub(crate) const ATTRIBUTES: usize = 15;

/// Head length in units of edge half-thickness, before per-edge scaling.
const HEAD_SCALE: f32 = 5.0;

/// Vertex layout (60 bytes):
///
///  offset  0  position       [f32; 2]  loc 0
///  offset  8  other          [f32; 2]  loc 1
///  offset 16  thickness      f32       loc 2
///  offset 20  target_size    f32       loc 3
///  offset 24  delay          f32       loc 4
///  offset 28  minus          f32       loc 5
///  offset 32  head           f32       loc 6
///  offset 36  head_position  f32       loc 7
///  offset 40  color          f32       loc 8
///  offset 44  alpha          f32       loc 9
///  offset 48  head_kind      f32       loc 10
///  offset 52  head_size      f32       loc 11
///  offset 56  tan_angle      f32       loc 12
const VERTEX_ATTRS: [wgpu::VertexAttribute; 13] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
    2 => Float32,
    3 => Float32,
    4 => Float32,
    5 => Float32,
    6 => Float32,
    7 => Float32,
    8 => Float32,
    9 => Float32,
    10 => Float32,
    11 => Float32,
    12 => Float32
];

#[derive(Debug, Default)]
pub struct ArrowEdges;

impl ArrowEdges {
    pub fn new() -> Self {
        Self
    }
}

impl EdgeStyle for ArrowEdges {
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
        let w = edge.size / 2.0;
        let p1 = Vec2::new(source.x, source.y);
        let p2 = Vec2::new(target.x, target.y);
        let target_size = target.size * target.shape.radius_scale(p2.x - p1.x, p2.y - p1.y);

        let color = common::resolve_edge_color(edge, source, target, settings);
        let alpha = color.alpha_f32();
        let packed = packed_channel(color);
        let head_kind = edge.head.discriminant();
        let head_size = edge.head_size;
        let tan_head = edge.tan_head_angle;
        let tan_tail = edge.tan_tail_angle;

        // (own, other, delay, minus, head, head_position, tan_angle);
        // rows 0-5 are the body quad, 6-8 the head triangle.
        let rows: [(Vec2, Vec2, f32, f32, f32, f32, f32); POINTS] = [
            (p1, p2, 0.0, 0.0, 0.0, 0.0, tan_tail),
            (p2, p1, 1.0, 1.0, 0.0, 0.0, tan_head),
            (p2, p1, 1.0, 0.0, 0.0, 0.0, tan_head),
            (p2, p1, 1.0, 0.0, 0.0, 0.0, tan_head),
            (p1, p2, 0.0, 1.0, 0.0, 0.0, tan_tail),
            (p1, p2, 0.0, 0.0, 0.0, 0.0, tan_tail),
            (p2, p1, 1.0, 0.0, 1.0, -1.0, 0.0),
            (p2, p1, 1.0, 0.0, 1.0, 0.0, 0.0),
            (p2, p1, 1.0, 0.0, 1.0, 1.0, 0.0),
        ];

        for (row, (own, other, delay, minus, head, head_position, tan)) in
            rows.into_iter().enumerate()
        {
            let v = &mut out[row * ATTRIBUTES..(row + 1) * ATTRIBUTES];
            v[0] = own.x;
            v[1] = own.y;
            v[2] = other.x;
            v[3] = other.y;
            v[4] = w;
            v[5] = target_size;
            v[6] = delay;
            v[7] = minus;
            v[8] = head;
            v[9] = head_position;
            v[10] = packed;
            v[11] = alpha;
            v[12] = head_kind;
            v[13] = head_size;
            v[14] = tan;
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
                label: "arrow edge style",
                shader: include_str!("shaders/arrow.wgsl"),
                vertex_stride: (ATTRIBUTES * std::mem::size_of::<f32>()) as u64,
                attributes: &VERTEX_ATTRS,
                uniform_size: std::mem::size_of::<ArrowUniforms>() as u64,
            },
        )
    }

    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        program: &StyleProgram,
        params: &DrawParams<'_>,
    ) {
        let settings = params.settings;
        let uniforms = ArrowUniforms {
            matrix: params.matrix.to_gpu(),
            half_pi: rotation2(std::f32::consts::FRAC_PI_2),
            half_pi_minus: rotation2(-std::f32::consts::FRAC_PI_2),
            resolution: [params.width, params.height],
            ratio: params.ratio / params.ratio.powf(settings.edges_pow_ratio),
            node_ratio: params.ratio.powf(settings.nodes_pow_ratio) / params.ratio,
            arrow_head: HEAD_SCALE,
            scale: params.scale,
            _pad: [0.0; 2],
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

/// Uniform block (112 bytes, WGSL uniform layout):
///
///  offset   0  matrix         mat3x3<f32>  (three vec4-padded columns)
///  offset  48  half_pi        mat2x2<f32>
///  offset  64  half_pi_minus  mat2x2<f32>
///  offset  80  resolution     vec2<f32>
///  offset  88  ratio          f32
///  offset  92  node_ratio     f32
///  offset  96  arrow_head     f32
///  offset 100  scale          f32
///  offset 104  (pad to struct align)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ArrowUniforms {
    matrix: [[f32; 4]; 3],
    half_pi: [f32; 4],
    half_pi_minus: [f32; 4],
    resolution: [f32; 2],
    ratio: f32,
    node_ratio: f32,
    arrow_head: f32,
    scale: f32,
    _pad: [f32; 2],
}

/// Column-major 2x2 rotation, matching WGSL `mat2x2<f32>` layout.
fn rotation2(angle: f32) -> [f32; 4] {
    let (s, c) = angle.sin_cos();
    [c, s, -s, c]
}

#[cfg(test)]
mod tests {
    use skein_graph::{HeadKind, NodeShape, Rgba};

    use super::*;

    fn encode(edge: &Edge, source: &Node, target: &Node) -> Vec<f32> {
        let style = ArrowEdges::new();
        let mut out = vec![0.0; POINTS * ATTRIBUTES];
        style.encode_edge(edge, source, target, &mut out, &Settings::default());
        out
    }

    fn vertex(data: &[f32], row: usize) -> &[f32] {
        &data[row * ATTRIBUTES..(row + 1) * ATTRIBUTES]
    }

    #[test]
    fn layout_is_nine_by_fifteen() {
        let style = ArrowEdges::new();
        assert_eq!(style.points(), 9);
        assert_eq!(style.attributes(), 15);
        assert_eq!(VERTEX_ATTRS.len(), 13);
    }

    #[test]
    fn uniform_block_is_gpu_sized() {
        assert_eq!(std::mem::size_of::<ArrowUniforms>(), 112);
    }

    #[test]
    fn body_and_head_rows_carry_the_expected_flags() {
        let source = Node::new("s", 0.0, 0.0).with_size(10.0);
        let target = Node::new("t", 10.0, 0.0).with_size(4.0);
        let edge = Edge::new("e", "s", "t").with_size(2.0);
        let data = encode(&edge, &source, &target);

        // First body vertex sits at the source, pointing at the target.
        let v0 = vertex(&data, 0);
        assert_eq!(&v0[0..4], &[0.0, 0.0, 10.0, 0.0]);
        assert_eq!(v0[4], 1.0, "thickness is half the edge size");
        assert_eq!(v0[5], 4.0, "disc target keeps its plain radius");
        assert_eq!(&v0[6..10], &[0.0, 0.0, 0.0, 0.0]);

        // Target-end body vertices swap endpoints and set the delay flag.
        let v1 = vertex(&data, 1);
        assert_eq!(&v1[0..4], &[10.0, 0.0, 0.0, 0.0]);
        assert_eq!(v1[6], 1.0, "delay");
        assert_eq!(v1[7], 1.0, "minus");

        // Head rows: head flag set, corner selector runs -1, 0, 1.
        for (row, corner) in [(6, -1.0), (7, 0.0), (8, 1.0)] {
            let v = vertex(&data, row);
            assert_eq!(v[6], 1.0, "head vertices delay");
            assert_eq!(v[8], 1.0, "head flag");
            assert_eq!(v[9], corner);
            assert_eq!(v[14], 0.0, "head vertices carry no cap shear");
        }
    }

    #[test]
    fn square_targets_grow_with_approach_angle() {
        let source = Node::new("s", 0.0, 0.0);
        let target = Node::new("t", 8.0, 8.0).with_size(6.0).with_shape(NodeShape::Square);
        let edge = Edge::new("e", "s", "t");
        let data = encode(&edge, &source, &target);
        // Diagonal approach reaches the square's corner: radius * sqrt(2).
        let expected = 6.0 * 2.0_f32.sqrt();
        assert!((vertex(&data, 0)[5] - expected).abs() < 1e-4);
    }

    #[test]
    fn head_kind_and_angles_pass_through() {
        let source = Node::new("s", 0.0, 0.0);
        let target = Node::new("t", 5.0, 0.0);
        let edge = Edge::new("e", "s", "t")
            .with_head(HeadKind::Inhibitory)
            .with_head_size(2.5)
            .with_tangents(0.3, -0.2);
        let data = encode(&edge, &source, &target);

        let v0 = vertex(&data, 0);
        assert_eq!(v0[12], 1.0, "inhibitory discriminant");
        assert_eq!(v0[13], 2.5);
        assert_eq!(v0[14], -0.2, "source end uses the tail angle");
        assert_eq!(vertex(&data, 1)[14], 0.3, "target end uses the head angle");
    }

    #[test]
    fn colors_pack_with_separate_alpha() {
        let source = Node::new("s", 0.0, 0.0);
        let target = Node::new("t", 5.0, 0.0);
        let edge = Edge::new("e", "s", "t").with_color(Rgba::new(255, 0, 0, 128));
        let data = encode(&edge, &source, &target);
        let v0 = vertex(&data, 0);
        assert_eq!(v0[10], (255 * 65536) as f32);
        assert!((v0[11] - 128.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_matrices_are_quarter_turns() {
        let half_pi = rotation2(std::f32::consts::FRAC_PI_2);
        // Column-major: first column is R * (1, 0).
        assert!(half_pi[0].abs() < 1e-6);
        assert!((half_pi[1] - 1.0).abs() < 1e-6);
        let minus = rotation2(-std::f32::consts::FRAC_PI_2);
        assert!((minus[1] + 1.0).abs() < 1e-6);
    }
}
