//! Interactive demo host for the skein renderer.
//!
//! Builds a two-tier demo graph (a signaling ring in front of a wide
//! lattice) and drives the renderer with raw winit events: drag to pan,
//! wheel to zoom, keys to flip render policy at runtime. Run with
//! `RUST_LOG=skein_engine=debug` to watch batch jobs and surface
//! reconfiguration as you interact.

use anyhow::Result;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use skein_engine::camera::Camera;
use skein_engine::core::{App, AppControl, FrameCtx};
use skein_engine::device::GpuInit;
use skein_engine::geom::Vec2;
use skein_engine::labels::{LabelItem, LabelSink};
use skein_engine::logging::{self, LoggingConfig};
use skein_engine::renderer::Renderer;
use skein_engine::settings::{RenderOverrides, Settings};
use skein_engine::style::StyleRegistry;
use skein_engine::window::{Runtime, RuntimeConfig};

use skein_graph::{Edge, GraphStore, HeadKind, Node, NodeShape, Rgba};

/// Zoom ratio multiplier per wheel notch. Below 1 so scrolling up zooms in.
const ZOOM_STEP: f32 = 1.0 / 1.15;

fn main() -> Result<()> {
    logging::init_logging(LoggingConfig::default());

    println!();
    println!("  skein viewer");
    println!("  drag   pan                    wheel  zoom");
    println!("  b      toggle edge batching   h      toggle hide-edges-on-move");
    println!("  l      toggle labels          r      reset camera");
    println!("  esc    quit");
    println!();

    let config = RuntimeConfig {
        title: "skein viewer".to_owned(),
        initial_size: LogicalSize::new(1100.0, 760.0),
    };
    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::AutoVsync,
        ..GpuInit::default()
    };
    Runtime::run(config, gpu_init, Viewer::new(sample_graph()?))
}

// ── Viewer ─────────────────────────────────────────────────────────────

/// Demo application state.
///
/// The renderer is created on the first frame, once a GPU context
/// exists; window events arriving before that only update interaction
/// state.
struct Viewer {
    graph: GraphStore,
    renderer: Option<Renderer>,
    cursor: Option<Vec2>,
    dragging: bool,
}

impl Viewer {
    fn new(graph: GraphStore) -> Self {
        Self { graph, renderer: None, cursor: None, dragging: false }
    }

    /// Flips one settings field and requests a redraw.
    fn flip(&mut self, name: &str, flip: impl FnOnce(&mut Settings) -> bool) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let mut settings = renderer.settings().clone();
        let enabled = flip(&mut settings);
        renderer.set_settings(settings);
        renderer.render(RenderOverrides::NONE);
        log::info!("{name}: {}", if enabled { "on" } else { "off" });
    }

    fn reset_camera(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            *renderer.camera_mut() = Camera::new();
            renderer.render(RenderOverrides::NONE);
        }
    }

    fn on_key(&mut self, code: KeyCode) -> AppControl {
        match code {
            KeyCode::Escape => return AppControl::Exit,
            KeyCode::KeyB => self.flip("edge batching", |s| {
                s.batch_edges_drawing = !s.batch_edges_drawing;
                s.batch_edges_drawing
            }),
            KeyCode::KeyH => self.flip("hide edges on move", |s| {
                s.hide_edges_on_move = !s.hide_edges_on_move;
                s.hide_edges_on_move
            }),
            KeyCode::KeyL => self.flip("labels", |s| {
                s.draw_labels = !s.draw_labels;
                s.draw_labels
            }),
            KeyCode::KeyR => self.reset_camera(),
            _ => {}
        }
        AppControl::Continue
    }
}

impl App for Viewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                // Physical pixels, matching the camera's screen space.
                let at = Vec2::new(position.x as f32, position.y as f32);
                if self.dragging {
                    if let (Some(renderer), Some(last)) = (self.renderer.as_mut(), self.cursor) {
                        renderer.camera_mut().pan_screen(at - last);
                        renderer.render(RenderOverrides::NONE);
                    }
                }
                self.cursor = Some(at);
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = *state == ElementState::Pressed;
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.camera_mut().set_moving(self.dragging);
                    // The release frame redraws with edges restored.
                    renderer.render(RenderOverrides::NONE);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 60.0,
                };
                if notches != 0.0 {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.camera_mut().zoom_by(ZOOM_STEP.powf(notches));
                        renderer.render(RenderOverrides::NONE);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if let PhysicalKey::Code(code) = event.physical_key {
                    return self.on_key(code);
                }
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.renderer.is_none() {
            let mut renderer =
                Renderer::new(ctx.gpu, StyleRegistry::builtin(), demo_settings());
            renderer.set_label_sink(Some(Box::new(LabelLog::default())));
            renderer.process(&self.graph);
            renderer.render(RenderOverrides::NONE);
            self.renderer = Some(renderer);
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        match renderer.frame(ctx.gpu, &mut self.graph, ctx.time.now) {
            Ok(_) => AppControl::Continue,
            Err(err) => {
                log::error!("frame failed: {err}");
                AppControl::Exit
            }
        }
    }
}

// ── Label sink ─────────────────────────────────────────────────────────

/// Counts visible labels instead of rasterizing them.
///
/// The renderer hands label anchors to the host every presented frame;
/// a real host would feed them to its text stack. Logging the count
/// when it changes keeps the contract observable without a font
/// dependency.
#[derive(Default)]
struct LabelLog {
    visible: usize,
}

impl LabelSink for LabelLog {
    fn draw_labels(&mut self, labels: &[LabelItem]) {
        if labels.len() != self.visible {
            log::debug!("labels visible: {} -> {}", self.visible, labels.len());
            self.visible = labels.len();
        }
    }
}

// ── Demo content ───────────────────────────────────────────────────────

fn demo_settings() -> Settings {
    Settings {
        background: Rgba::opaque(0xfb, 0xfa, 0xf7),
        default_node_color: Rgba::opaque(0x2f, 0x3a, 0x46),
        default_edge_color: Rgba::opaque(0xb9, 0xb2, 0xa6),
        batch_edges_drawing: true,
        edges_batch_size: 64,
        ..Settings::default()
    }
}

/// Two-tier demo graph: a signaling ring in front of a wide lattice.
///
/// The lattice gives the batch scheduler a few hundred line elements to
/// walk through; the ring exercises arrow heads, inhibitory heads,
/// square boundary trimming, hidden elements and labels.
fn sample_graph() -> Result<GraphStore> {
    let mut graph = GraphStore::new();

    // Background lattice, pushed one depth tier back.
    const COLS: i32 = 15;
    const ROWS: i32 = 10;
    const STEP: f32 = 85.0;
    let faint = Rgba::new(0x8a, 0x94, 0x9e, 0x50);
    for col in 0..COLS {
        for row in 0..ROWS {
            let x = (col - COLS / 2) as f32 * STEP;
            let y = (row as f32 - (ROWS - 1) as f32 / 2.0) * STEP;
            graph.add_node(
                Node::new(format!("grid:{col}:{row}"), x, y)
                    .with_size(2.5)
                    .with_color(Rgba::new(0x8a, 0x94, 0x9e, 0x70))
                    .with_z(1.0),
            )?;
        }
    }
    for col in 0..COLS {
        for row in 0..ROWS {
            if col + 1 < COLS {
                graph.add_edge(
                    Edge::new(
                        format!("grid:{col}:{row}>r"),
                        format!("grid:{col}:{row}"),
                        format!("grid:{}:{row}", col + 1),
                    )
                    .with_style("line")
                    .with_size(0.6)
                    .with_color(faint)
                    .with_z(1.0),
                )?;
            }
            if row + 1 < ROWS {
                graph.add_edge(
                    Edge::new(
                        format!("grid:{col}:{row}>d"),
                        format!("grid:{col}:{row}"),
                        format!("grid:{col}:{}", row + 1),
                    )
                    .with_style("line")
                    .with_size(0.6)
                    .with_color(faint)
                    .with_z(1.0),
                )?;
            }
        }
    }

    // Foreground ring. Default z = 0 keeps it on top of the lattice.
    let ring = 12usize;
    let radius = 230.0f32;
    let palette = [
        Rgba::opaque(0x2a, 0x9d, 0x8f),
        Rgba::opaque(0xe9, 0xc4, 0x6a),
        Rgba::opaque(0xf4, 0xa2, 0x61),
        Rgba::opaque(0xe7, 0x6f, 0x51),
    ];
    graph.add_node(
        Node::new("core", 0.0, 0.0)
            .with_size(15.0)
            .with_color(Rgba::opaque(0x26, 0x46, 0x53))
            .with_label("core"),
    )?;
    for i in 0..ring {
        let angle = std::f32::consts::TAU * i as f32 / ring as f32;
        let (sin, cos) = angle.sin_cos();
        let mut node = Node::new(format!("n{i}"), radius * cos, radius * sin)
            .with_size(9.0 + (i % 3) as f32 * 2.0)
            .with_color(palette[i % palette.len()]);
        if i % 3 == 0 {
            node = node.with_label(format!("unit {i}"));
        }
        graph.add_node(node)?;

        // Spokes alternate activation and inhibition notation.
        let head = if i % 2 == 0 { HeadKind::Arrow } else { HeadKind::Inhibitory };
        graph.add_edge(
            Edge::new(format!("spoke{i}"), "core", format!("n{i}"))
                .with_size(2.0)
                .with_head(head)
                .with_head_size(1.4),
        )?;
    }
    for i in 0..ring {
        let next = (i + 1) % ring;
        graph.add_edge(
            Edge::new(format!("ring{i}"), format!("n{i}"), format!("n{next}"))
                .with_size(1.4)
                .with_color(Rgba::new(0x26, 0x46, 0x53, 0xb0))
                .with_tangents(0.35, -0.35),
        )?;
    }

    // A square target: arrows stop at its boundary, not its circumradius.
    graph.add_node(
        Node::new("gate", 0.0, -radius - 130.0)
            .with_size(13.0)
            .with_shape(NodeShape::Square)
            .with_color(Rgba::opaque(0x8d, 0x5a, 0x97))
            .with_label("gate"),
    )?;
    graph.add_edge(Edge::new("core>gate", "core", "gate").with_size(2.2).with_head_size(1.5))?;
    graph.add_edge(
        Edge::new("gate>n6", "gate", "n6")
            .with_size(1.8)
            .with_head(HeadKind::Inhibitory),
    )?;

    // Hidden elements keep their buffer slots; nothing should draw.
    graph.add_node(
        Node::new("ghost", radius + 150.0, 60.0)
            .with_hidden(true)
            .with_label("ghost"),
    )?;
    graph.add_edge(Edge::new("n0>ghost", "n0", "ghost").with_size(1.5))?;
    graph.add_edge(Edge::new("n3>n9", "n3", "n9").with_size(1.5).with_hidden(true))?;

    Ok(graph)
}
