//! Shared plumbing for the built-in styles.

use skein_graph::{Edge, Node, Rgba};

use crate::program::StyleProgram;
use crate::settings::{EdgeColorMode, Settings};
use crate::style::ProgramError;

/// Straight-alpha blending over whatever is already in the target.
pub(crate) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Resolves the drawable color of an edge.
///
/// An explicit edge color always wins. Otherwise the color mode picks the
/// source node's color, the target node's color or the default edge
/// color; node-derived colors fall back to the default node color when
/// the node has none.
pub(crate) fn resolve_edge_color(
    edge: &Edge,
    source: &Node,
    target: &Node,
    settings: &Settings,
) -> Rgba {
    if let Some(color) = edge.color {
        return color;
    }
    match settings.edge_color_mode {
        EdgeColorMode::Default => settings.default_edge_color,
        EdgeColorMode::Source => source.color.unwrap_or(settings.default_node_color),
        EdgeColorMode::Target => target.color.unwrap_or(settings.default_node_color),
    }
}

/// Everything a built-in style needs to say about its pipeline.
pub(crate) struct ProgramDesc<'a> {
    pub label: &'a str,
    pub shader: &'a str,
    /// Bytes per vertex; attributes are tightly packed f32s.
    pub vertex_stride: u64,
    pub attributes: &'a [wgpu::VertexAttribute],
    pub uniform_size: u64,
}

/// Builds the one-bind-group pipeline shape every built-in style uses:
/// a single uniform block at `@group(0) @binding(0)`, one vertex buffer,
/// triangle list, straight-alpha blend, no depth.
pub(crate) fn build_style_program(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    desc: &ProgramDesc<'_>,
) -> Result<StyleProgram, ProgramError> {
    let min_size = std::num::NonZeroU64::new(desc.uniform_size)
        .ok_or_else(|| ProgramError::new(desc.label, "uniform block size must be non-zero"))?;

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.shader.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(desc.label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(min_size),
            },
            count: None,
        }],
    });

    let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(desc.label),
        size: desc.uniform_size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(desc.label),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniforms.as_entire_binding() }],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: desc.vertex_stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: desc.attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(StyleProgram { pipeline, uniforms, bind_group })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Edge, Node, Node) {
        let source = Node::new("s", 0.0, 0.0).with_color(Rgba::opaque(10, 0, 0));
        let target = Node::new("t", 1.0, 0.0);
        let edge = Edge::new("e", "s", "t");
        (edge, source, target)
    }

    #[test]
    fn explicit_edge_color_wins() {
        let (mut edge, source, target) = fixture();
        edge.color = Some(Rgba::opaque(1, 2, 3));
        let mut settings = Settings::default();
        settings.edge_color_mode = EdgeColorMode::Source;
        let c = resolve_edge_color(&edge, &source, &target, &settings);
        assert_eq!(c, Rgba::opaque(1, 2, 3));
    }

    #[test]
    fn source_mode_inherits_source_color() {
        let (edge, source, target) = fixture();
        let mut settings = Settings::default();
        settings.edge_color_mode = EdgeColorMode::Source;
        let c = resolve_edge_color(&edge, &source, &target, &settings);
        assert_eq!(c, Rgba::opaque(10, 0, 0));
    }

    #[test]
    fn target_mode_without_node_color_uses_default_node_color() {
        let (edge, source, target) = fixture();
        let mut settings = Settings::default();
        settings.edge_color_mode = EdgeColorMode::Target;
        settings.default_node_color = Rgba::opaque(7, 7, 7);
        let c = resolve_edge_color(&edge, &source, &target, &settings);
        assert_eq!(c, Rgba::opaque(7, 7, 7));
    }

    #[test]
    fn default_mode_uses_default_edge_color() {
        let (edge, source, target) = fixture();
        let settings = Settings::default();
        let c = resolve_edge_color(&edge, &source, &target, &settings);
        assert_eq!(c, settings.default_edge_color);
    }
}
