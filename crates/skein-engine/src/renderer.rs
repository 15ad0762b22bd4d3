//! Renderer facade.
//!
//! [`Renderer`] owns everything with per-surface lifetime: the layer
//! set and its GPU buffers, both program caches, the offscreen targets
//! and compositor, the edge batch job slot and the apply-view debounce.
//! Hosts drive it with three calls: [`Renderer::process`] after graph
//! mutations, [`Renderer::render`] to request a redraw, and
//! [`Renderer::frame`] once per windowing-system redraw. All GPU work
//! happens inside `frame`; `process` and `render` are cheap and safe to
//! call from event handlers.
//!
//! A frame runs at most one of two draw paths: a full render (clear
//! both targets, draw the synchronous plan, restart the batch job) or
//! one batch tick accumulating onto the edges target. The compositor
//! then lays edges under scene onto the acquired surface texture, so
//! partial batch progress is visible immediately.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use skein_graph::GraphStore;

use crate::camera::Camera;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::labels::{LabelSink, collect_labels};
use crate::layer::{GpuLayerSet, LayerSet};
use crate::program::ProgramCache;
use crate::schedule::{ApplyDebounce, BatchDraw, EdgeBatchJob, JobSlot, PlanOp, plan_sync};
use crate::settings::{RenderOverrides, Settings};
use crate::style::{DrawParams, ProgramError, StyleRegistry};
use crate::targets::{self, Compositor, PassTargets};

/// Failure reported by [`Renderer::frame`].
#[derive(Debug)]
pub enum RenderError {
    /// A style failed to produce a usable pipeline.
    Program(ProgramError),
    /// The surface cannot be recovered (device lost, out of memory).
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Program(err) => write!(f, "render failed: {err}"),
            RenderError::Surface(err) => write!(f, "surface unrecoverable: {err}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::Program(err) => Some(err),
            RenderError::Surface(err) => Some(err),
        }
    }
}

impl From<ProgramError> for RenderError {
    fn from(err: ProgramError) -> Self {
        RenderError::Program(err)
    }
}

/// What a completed [`Renderer::frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// A frame was recorded and presented.
    pub presented: bool,
    /// More frames are wanted without further input: a batch job is
    /// mid-flight or the apply-view debounce is armed.
    pub animating: bool,
}

impl FrameOutcome {
    const SKIPPED: FrameOutcome = FrameOutcome { presented: false, animating: true };
}

pub struct Renderer {
    registry: StyleRegistry,
    settings: Settings,
    camera: Camera,

    layers: LayerSet,
    gpu_layers: Option<GpuLayerSet>,
    node_programs: ProgramCache,
    edge_programs: ProgramCache,

    targets: PassTargets,
    compositor: Compositor,

    job: JobSlot,
    apply_debounce: ApplyDebounce,
    label_sink: Option<Box<dyn LabelSink>>,

    overrides: RenderOverrides,
    pending_render: bool,
    full_redraw: bool,
}

impl Renderer {
    /// Builds a renderer against an initialized GPU context.
    ///
    /// The offscreen targets and the compositor are format-bound to the
    /// surface; style programs are built lazily on first draw.
    pub fn new(gpu: &Gpu<'_>, registry: StyleRegistry, settings: Settings) -> Self {
        let size = gpu.size();
        let targets = PassTargets::new(
            gpu.device(),
            gpu.surface_format(),
            (size.width, size.height),
            settings.oversampling_ratio,
        );
        let compositor = Compositor::new(gpu.device(), gpu.surface_format());
        let apply_debounce = ApplyDebounce::new(settings.view_apply_interval);
        Self {
            registry,
            settings,
            camera: Camera::new(),
            layers: LayerSet::new(),
            gpu_layers: None,
            node_programs: ProgramCache::new(),
            edge_programs: ProgramCache::new(),
            targets,
            compositor,
            job: JobSlot::default(),
            apply_debounce,
            label_sink: None,
            overrides: RenderOverrides::NONE,
            pending_render: false,
            full_redraw: true,
        }
    }

    // ── accessors ──────────────────────────────────────────────────────

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings wholesale. Fields that influence layer
    /// grouping (the default style names) take effect at the next
    /// [`Renderer::process`]; everything else at the next frame.
    pub fn set_settings(&mut self, settings: Settings) {
        self.apply_debounce = ApplyDebounce::new(settings.view_apply_interval);
        self.settings = settings;
        self.full_redraw = true;
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Styles registered here are picked up at the next
    /// [`Renderer::process`], since grouping bakes canonical style names
    /// into the layer set.
    pub fn registry_mut(&mut self) -> &mut StyleRegistry {
        &mut self.registry
    }

    pub fn set_label_sink(&mut self, sink: Option<Box<dyn LabelSink>>) {
        self.label_sink = sink;
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    /// Rebuilds the layer set from the current graph.
    ///
    /// Call after structural or visual mutations (add/remove, position,
    /// color, size, style, z). Pure CPU work; the GPU copies are
    /// refreshed by the next full render. Cancels any batch job, whose
    /// cursor would be stale against the new layers.
    pub fn process(&mut self, graph: &GraphStore) {
        self.layers.rebuild(graph, &self.registry, &self.settings);
        self.job.cancel();
        self.full_redraw = true;
    }

    /// Requests a full redraw at the next frame with `overrides` layered
    /// over the stored settings.
    ///
    /// Cancels the in-flight batch job immediately; with batching on,
    /// the replacement starts from the first edge window when the
    /// request executes. Also re-arms the apply-view debounce.
    pub fn render(&mut self, overrides: RenderOverrides) {
        self.job.cancel();
        self.overrides = overrides;
        self.pending_render = true;
        self.apply_debounce.arm(Instant::now());
    }

    /// Forwards a surface resize and schedules a full redraw.
    pub fn resize(&mut self, gpu: &mut Gpu<'_>, new_size: winit::dpi::PhysicalSize<u32>) {
        gpu.resize(new_size);
        self.full_redraw = true;
    }

    /// Drops all rendered state: layers, GPU buffers and the batch job.
    /// The next frame presents plain background until the host processes
    /// and renders again. The graph itself is untouched.
    pub fn clear(&mut self) {
        self.job.cancel();
        self.layers = LayerSet::new();
        self.gpu_layers = None;
        self.full_redraw = true;
    }

    /// Runs one frame: executes a pending full render or one batch
    /// tick, fires the apply-view debounce when due, collects labels
    /// and composites onto the surface.
    ///
    /// Surface loss is absorbed where possible: the frame is skipped
    /// and, after a reconfigure, the next one redraws in full. Only
    /// unrecoverable surface states and program build failures surface
    /// as errors.
    pub fn frame(
        &mut self,
        gpu: &mut Gpu<'_>,
        graph: &mut GraphStore,
        now: Instant,
    ) -> Result<FrameOutcome, RenderError> {
        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(FrameOutcome { presented: false, animating: false });
        }

        if self.targets.ensure_size(
            gpu.device(),
            (size.width, size.height),
            self.settings.oversampling_ratio,
        ) {
            // Accumulated batch output died with the old textures.
            self.full_redraw = true;
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match gpu.handle_surface_error(err.clone()) {
                    SurfaceErrorAction::Reconfigured => {
                        self.full_redraw = true;
                        Ok(FrameOutcome::SKIPPED)
                    }
                    SurfaceErrorAction::SkipFrame => Ok(FrameOutcome::SKIPPED),
                    SurfaceErrorAction::Fatal => Err(RenderError::Surface(err)),
                };
            }
        };

        if self.pending_render || self.full_redraw {
            self.execute_render(gpu, graph, &mut frame.encoder)?;
            self.pending_render = false;
            self.full_redraw = false;
        } else if self.job.is_active() {
            self.execute_batch_tick(gpu, graph, &mut frame.encoder)?;
        }

        if self.apply_debounce.fire_if_due(now) {
            self.camera.apply_view(
                graph,
                size.width as f32,
                size.height as f32,
                self.settings.nodes_pow_ratio,
            );
        }

        let effective = self.settings.overlaid(&self.overrides);
        if effective.draw_labels {
            if let Some(sink) = self.label_sink.as_mut() {
                let labels = collect_labels(
                    graph,
                    size.width as f32,
                    size.height as f32,
                    effective.label_cull_margin,
                );
                sink.draw_labels(&labels);
            }
        }

        self.compositor.composite(
            gpu.device(),
            &mut frame.encoder,
            &self.targets,
            &frame.view,
            effective.background,
        );
        gpu.submit(frame);

        Ok(FrameOutcome {
            presented: true,
            animating: self.job.is_active() || self.apply_debounce.is_armed(),
        })
    }

    // ── draw paths ─────────────────────────────────────────────────────

    /// Full render: refresh GPU buffers, clear both targets, draw the
    /// synchronous plan in layer order, restart the batch job.
    fn execute_render(
        &mut self,
        gpu: &Gpu<'_>,
        graph: &GraphStore,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<(), RenderError> {
        let effective = self.settings.overlaid(&self.overrides);
        let moving = self.camera.is_moving();

        self.job.cancel();

        let uploaded = self.gpu_layers.as_ref().map(GpuLayerSet::epoch);
        if uploaded != Some(self.layers.epoch()) {
            self.gpu_layers = Some(GpuLayerSet::upload(gpu.device(), &self.layers));
        }

        let draw_edges =
            effective.draw_edges && !(effective.hide_edges_on_move && moving);
        let params = self.draw_params(gpu, &effective);
        self.prepare_programs(gpu, &params, effective.draw_nodes, draw_edges)?;

        let plan = plan_sync(&self.layers, graph, &effective, moving);
        targets::clear_target(encoder, self.targets.edges_view(), wgpu::Color::TRANSPARENT);

        // One pass for the whole plan keeps depth interleaving exact:
        // an edge layer between two node tiers draws between them.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("skein scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.targets.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(gpu_layers) = self.gpu_layers.as_ref() {
                for op in &plan {
                    match op {
                        PlanOp::NodeGroup { layer, group, range } => {
                            let name = self.layers.layers()[*layer].groups[*group].style.as_str();
                            let (Some(style), Some(program), Some(buffers)) = (
                                self.registry.node_style(name),
                                self.node_programs.get(name),
                                gpu_layers.group(*layer, *group),
                            ) else {
                                continue;
                            };
                            style.draw(&mut rpass, program, buffers, *range);
                        }
                        PlanOp::EdgeGroup { layer, group, runs } => {
                            let name = self.layers.layers()[*layer].groups[*group].style.as_str();
                            let (Some(style), Some(program), Some(buffers)) = (
                                self.registry.edge_style(name),
                                self.edge_programs.get(name),
                                gpu_layers.group(*layer, *group),
                            ) else {
                                continue;
                            };
                            for run in runs {
                                style.draw(&mut rpass, program, buffers, *run);
                            }
                        }
                    }
                }
            }
        }

        if effective.batch_edges_drawing && draw_edges {
            self.job
                .replace(EdgeBatchJob::new(&self.layers, effective.batch_size()));
            if self.job.is_active() {
                log::debug!(
                    "edge batch job started: {} elements, batch size {}",
                    self.layers.edge_element_total(),
                    effective.batch_size(),
                );
            }
        }
        Ok(())
    }

    /// One batch tick: draw the job's next window onto the edges target
    /// without clearing it.
    fn execute_batch_tick(
        &mut self,
        gpu: &Gpu<'_>,
        graph: &GraphStore,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<(), RenderError> {
        let Some(draw) = self.job.tick(&self.layers, graph) else {
            return Ok(());
        };
        let BatchDraw { layer, group, runs, .. } = draw;
        if runs.is_empty() {
            return Ok(());
        }

        let effective = self.settings.overlaid(&self.overrides);
        let params = self.draw_params(gpu, &effective);
        let name = self.layers.layers()[layer].groups[group].style.as_str();
        let Some(style) = self.registry.edge_style(name) else {
            return Ok(());
        };
        let format = self.targets.format();
        let program = self
            .edge_programs
            .get_or_build(name, format, || style.build_program(gpu.device(), format))?;
        style.write_uniforms(gpu.queue(), program, &params);

        let Some(buffers) = self
            .gpu_layers
            .as_ref()
            .and_then(|layers| layers.group(layer, group))
        else {
            return Ok(());
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("skein edge batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.targets.edges_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        for run in &runs {
            style.draw(&mut rpass, program, buffers, *run);
        }
        Ok(())
    }

    /// Builds programs and refreshes uniforms for every style the frame
    /// can touch: all styles present in the layer set, gated per
    /// category. Repeat styles across layers hit the cache.
    fn prepare_programs(
        &mut self,
        gpu: &Gpu<'_>,
        params: &DrawParams<'_>,
        draw_nodes: bool,
        draw_edges: bool,
    ) -> Result<(), RenderError> {
        let format = self.targets.format();
        for layer in self.layers.layers() {
            match layer.category {
                crate::layer::Category::Node if draw_nodes => {
                    for group in &layer.groups {
                        let name = group.style.as_str();
                        let Some(style) = self.registry.node_style(name) else {
                            continue;
                        };
                        let program = self.node_programs.get_or_build(name, format, || {
                            style.build_program(gpu.device(), format)
                        })?;
                        style.write_uniforms(gpu.queue(), program, params);
                    }
                }
                crate::layer::Category::Edge if draw_edges => {
                    for group in &layer.groups {
                        let name = group.style.as_str();
                        let Some(style) = self.registry.edge_style(name) else {
                            continue;
                        };
                        let program = self.edge_programs.get_or_build(name, format, || {
                            style.build_program(gpu.device(), format)
                        })?;
                        style.write_uniforms(gpu.queue(), program, params);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_params<'s>(&self, gpu: &Gpu<'_>, settings: &'s Settings) -> DrawParams<'s> {
        let size = gpu.size();
        let width = size.width as f32;
        let height = size.height as f32;
        DrawParams {
            matrix: self.camera.screen_matrix(width, height),
            width,
            height,
            ratio: self.camera.ratio(),
            scale: self.targets.backing_size().0 as f32 / width,
            settings,
        }
    }
}

// ── tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_carries_its_source() {
        let err = RenderError::from(ProgramError::new("disc", "shader rejected"));
        assert!(err.to_string().contains("disc"));
        assert!(err.source().is_some());
    }

    #[test]
    fn skipped_outcome_requests_another_frame() {
        assert!(!FrameOutcome::SKIPPED.presented);
        assert!(FrameOutcome::SKIPPED.animating);
    }
}
