//! Offscreen color targets and the final surface composite.
//!
//! The pipeline never draws straight to the swapchain. The synchronous
//! plan lands on the `scene` target and batched edge work accumulates
//! on the `edges` target across frames; a fullscreen composite then
//! lays edges under scene onto the surface. Keeping edges on their own
//! texture is what lets a half-finished batch job survive scene redraws
//! and camera-gated hiding without re-drawing completed windows.

use skein_graph::Rgba;

use crate::color;

/// A color texture plus its render/sample view.
struct TargetTexture {
    view: wgpu::TextureView,
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> TargetTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    TargetTexture {
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
    }
}

/// Backing size for a surface size under an oversampling factor.
///
/// Non-finite or non-positive factors fall back to 1, so a bad setting
/// degrades to native resolution instead of a zero-sized texture.
fn backing_size(surface: (u32, u32), oversampling: f32) -> (u32, u32) {
    let factor = if oversampling.is_finite() && oversampling > 0.0 {
        oversampling
    } else {
        1.0
    };
    let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
    (scale(surface.0), scale(surface.1))
}

/// The two offscreen targets, recreated together on resize.
pub struct PassTargets {
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    generation: u64,
    scene: TargetTexture,
    edges: TargetTexture,
}

impl PassTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        surface_size: (u32, u32),
        oversampling: f32,
    ) -> Self {
        let (width, height) = backing_size(surface_size, oversampling);
        Self {
            format,
            width,
            height,
            generation: 0,
            scene: create_target(device, "skein scene target", format, width, height),
            edges: create_target(device, "skein edges target", format, width, height),
        }
    }

    /// Recreates both targets if the required backing size changed.
    /// Returns true when they were recreated; any content (including a
    /// partially accumulated edge pass) is lost then.
    pub fn ensure_size(
        &mut self,
        device: &wgpu::Device,
        surface_size: (u32, u32),
        oversampling: f32,
    ) -> bool {
        let (width, height) = backing_size(surface_size, oversampling);
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.generation = self.generation.wrapping_add(1);
        self.scene = create_target(device, "skein scene target", self.format, width, height);
        self.edges = create_target(device, "skein edges target", self.format, width, height);
        true
    }

    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.view
    }

    pub fn edges_view(&self) -> &wgpu::TextureView {
        &self.edges.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Bumped whenever the textures are recreated; consumers holding
    /// bind groups over the views key their rebuilds off this.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Records an empty pass that clears `view` to `clear`.
pub fn clear_target(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, clear: wgpu::Color) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("skein clear pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

/// Fullscreen composite of the offscreen targets onto the surface.
///
/// One oversized triangle samples both textures; the shader computes
/// scene-over-edges and the blend lays that over the cleared background.
/// Offscreen content is premultiplied by construction (straight-alpha
/// draws onto transparent black), so both composition steps use the
/// One / OneMinusSrcAlpha form.
pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bound: Option<(u64, wgpu::BindGroup)>,
}

impl Compositor {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skein composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skein composite bgl"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skein composite pipeline layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skein composite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(premul_over_blend()),
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

        // Linear filtering matters here: the targets are oversampled,
        // so the composite is also the downsample.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skein composite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            sampler,
            bound: None,
        }
    }

    /// Composites both targets onto `surface_view`, clearing it to
    /// `background` first.
    pub fn composite(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        targets: &PassTargets,
        surface_view: &wgpu::TextureView,
        background: Rgba,
    ) {
        self.refresh_bind_group(device, targets);
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("skein composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color::to_wgpu(background)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&self.pipeline);
        let (_, bind_group) =
            self.bound.as_ref().expect("bind group refreshed before the pass");
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    /// Rebuilds the cached bind group when the targets were recreated.
    fn refresh_bind_group(&mut self, device: &wgpu::Device, targets: &PassTargets) {
        let generation = targets.generation();
        if matches!(&self.bound, Some((bound, _)) if *bound == generation) {
            return;
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skein composite bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(targets.scene_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(targets.edges_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.bound = Some((generation, bind_group));
    }
}

fn premul_over_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_rounds_and_clamps() {
        assert_eq!(backing_size((800, 600), 2.0), (1600, 1200));
        assert_eq!(backing_size((801, 601), 1.5), (1202, 902));
        assert_eq!(backing_size((1, 1), 0.1), (1, 1));
    }

    #[test]
    fn degenerate_oversampling_falls_back_to_native() {
        assert_eq!(backing_size((640, 480), 0.0), (640, 480));
        assert_eq!(backing_size((640, 480), -2.0), (640, 480));
        assert_eq!(backing_size((640, 480), f32::NAN), (640, 480));
    }
}
