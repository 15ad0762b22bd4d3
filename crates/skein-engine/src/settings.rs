//! Renderer configuration.
//!
//! [`Settings`] is the long-lived configuration a renderer is built with;
//! [`RenderOverrides`] are per-call toggles that shadow individual fields
//! for one render request without mutating the stored settings. The split
//! mirrors how hosts drive the pipeline: settings change rarely (style
//! defaults, batching policy), overrides change per interaction (hide
//! edges while a drag is in flight).

use std::time::Duration;

use skein_graph::Rgba;

/// How an edge without an explicit color picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeColorMode {
    /// Use the default edge color from the settings.
    #[default]
    Default,
    /// Inherit the resolved color of the source node.
    Source,
    /// Inherit the resolved color of the target node.
    Target,
}

/// Long-lived renderer configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Style name used for nodes that do not request one.
    pub default_node_style: String,
    /// Style name used for edges that do not request one.
    pub default_edge_style: String,
    /// Color applied to nodes without an explicit color.
    pub default_node_color: Rgba,
    /// Color applied to edges without an explicit color, when
    /// `edge_color_mode` is [`EdgeColorMode::Default`].
    pub default_edge_color: Rgba,
    /// Fallback source for edge colors.
    pub edge_color_mode: EdgeColorMode,
    /// Surface clear color.
    pub background: Rgba,

    pub draw_nodes: bool,
    pub draw_edges: bool,
    pub draw_labels: bool,
    /// Skip edge passes entirely while the camera reports motion.
    pub hide_edges_on_move: bool,

    /// Spread edge drawing over multiple frames instead of one pass.
    pub batch_edges_drawing: bool,
    /// Edge elements drawn per batched frame. Clamped to at least 1.
    pub edges_batch_size: usize,

    /// Backing-store multiplier for the offscreen targets.
    pub oversampling_ratio: f32,
    /// Exponent shaping how edge thickness reacts to camera zoom.
    /// 0 keeps screen thickness constant, 1 scales it with the graph.
    pub edges_pow_ratio: f32,
    /// Same, for node radii and label sizes.
    pub nodes_pow_ratio: f32,

    /// Quiet period before camera motion is applied to per-node view
    /// coordinates (labels follow the camera only after this settles).
    pub view_apply_interval: Duration,
    /// Labels are culled against the viewport grown by this margin, so
    /// text attached to a node just off screen still renders its
    /// overhanging part.
    pub label_cull_margin: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_node_style: "disc".to_owned(),
            default_edge_style: "arrow".to_owned(),
            default_node_color: Rgba::opaque(0x33, 0x33, 0x33),
            default_edge_color: Rgba::opaque(0xaa, 0xaa, 0xaa),
            edge_color_mode: EdgeColorMode::Default,
            background: Rgba::opaque(0xff, 0xff, 0xff),
            draw_nodes: true,
            draw_edges: true,
            draw_labels: true,
            hide_edges_on_move: false,
            batch_edges_drawing: false,
            edges_batch_size: 500,
            oversampling_ratio: 2.0,
            edges_pow_ratio: 0.5,
            nodes_pow_ratio: 0.5,
            view_apply_interval: Duration::from_millis(250),
            label_cull_margin: 50.0,
        }
    }
}

impl Settings {
    /// Normalized batch size.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.edges_batch_size.max(1)
    }

    /// Copy of these settings with any populated override applied.
    pub fn overlaid(&self, overrides: &RenderOverrides) -> Settings {
        let mut out = self.clone();
        if let Some(v) = overrides.draw_nodes {
            out.draw_nodes = v;
        }
        if let Some(v) = overrides.draw_edges {
            out.draw_edges = v;
        }
        if let Some(v) = overrides.draw_labels {
            out.draw_labels = v;
        }
        if let Some(v) = overrides.hide_edges_on_move {
            out.hide_edges_on_move = v;
        }
        if let Some(v) = overrides.batch_edges_drawing {
            out.batch_edges_drawing = v;
        }
        if let Some(v) = overrides.edges_batch_size {
            out.edges_batch_size = v;
        }
        out
    }
}

/// Per-render-call shadows for a subset of [`Settings`].
///
/// `None` fields fall through to the stored settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOverrides {
    pub draw_nodes: Option<bool>,
    pub draw_edges: Option<bool>,
    pub draw_labels: Option<bool>,
    pub hide_edges_on_move: Option<bool>,
    pub batch_edges_drawing: Option<bool>,
    pub edges_batch_size: Option<usize>,
}

impl RenderOverrides {
    pub const NONE: RenderOverrides = RenderOverrides {
        draw_nodes: None,
        draw_edges: None,
        draw_labels: None,
        hide_edges_on_move: None,
        batch_edges_drawing: None,
        edges_batch_size: None,
    };
}
