//! GPU mirrors of built layers.

use wgpu::util::DeviceExt;

use crate::layer::build::LayerSet;

/// Vertex (and optional index) buffer for one style group.
pub struct GpuGroup {
    pub vertex: wgpu::Buffer,
    pub index: Option<wgpu::Buffer>,
}

/// Uploaded counterpart of a [`LayerSet`], addressed by the same
/// `(layer, group)` coordinates and stamped with the epoch it mirrors.
///
/// Draw code must check [`GpuLayerSet::epoch`] against the live layer
/// set before using these buffers; a mismatch means the CPU side was
/// rebuilt and this upload describes geometry that no longer exists.
pub struct GpuLayerSet {
    groups: Vec<Vec<GpuGroup>>,
    epoch: u64,
}

impl GpuLayerSet {
    /// Uploads every group buffer of `set` as immutable vertex data.
    pub fn upload(device: &wgpu::Device, set: &LayerSet) -> Self {
        let groups = set
            .layers()
            .iter()
            .map(|layer| {
                layer
                    .groups
                    .iter()
                    .map(|group| {
                        let vertex =
                            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("layer group vertices"),
                                contents: bytemuck::cast_slice(group.buffer.data()),
                                usage: wgpu::BufferUsages::VERTEX,
                            });
                        let index = group.indices.as_ref().map(|indices| {
                            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("layer group indices"),
                                contents: bytemuck::cast_slice(indices),
                                usage: wgpu::BufferUsages::INDEX,
                            })
                        });
                        GpuGroup { vertex, index }
                    })
                    .collect()
            })
            .collect();
        Self { groups, epoch: set.epoch() }
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn group(&self, layer: usize, group: usize) -> Option<&GpuGroup> {
        self.groups.get(layer)?.get(group)
    }
}
