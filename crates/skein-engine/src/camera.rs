//! 2D graph camera.
//!
//! The camera owns the graph-to-screen transform consumed by every draw
//! pass: a point in graph space is translated against the camera center,
//! rotated, scaled by the inverse zoom ratio and finally shifted to the
//! viewport center. `ratio` is expressed as graph units per screen pixel,
//! so larger ratios show more of the graph.
//!
//! Besides the matrix, the camera can bake its transform into the
//! per-node view coordinates stored on the graph ([`Camera::apply_view`]).
//! Overlay passes such as labels read those instead of re-deriving the
//! transform per glyph.

use skein_graph::GraphStore;

use crate::geom::{Mat3, Rect, Vec2};

/// Zoom ratios below this are clamped; the matrix divides by ratio.
const MIN_RATIO: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Graph-space point shown at the viewport center.
    pub center: Vec2,
    /// Rotation applied to the graph, in radians.
    pub angle: f32,
    ratio: f32,
    moving: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self { center: Vec2::ZERO, angle: 0.0, ratio: 1.0, moving: false }
    }

    /// Graph units per screen pixel.
    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    #[inline]
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.max(MIN_RATIO);
    }

    /// Multiplies the zoom ratio; factors above 1 zoom out.
    #[inline]
    pub fn zoom_by(&mut self, factor: f32) {
        self.set_ratio(self.ratio * factor);
    }

    /// Moves the camera so the content appears to shift by `delta` screen
    /// pixels.
    pub fn pan_screen(&mut self, delta: Vec2) {
        let graph = self.rotate(delta * self.ratio);
        self.center = self.center - graph;
    }

    /// Whether an interaction is currently dragging or animating the
    /// camera. Render policy (edge hiding, view re-application) keys off
    /// this flag; the camera itself does not interpret it.
    #[inline]
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Graph-to-centered-screen transform (viewport center at the origin).
    pub fn matrix(&self) -> Mat3 {
        Mat3::scaling(1.0 / self.ratio)
            .mul(&Mat3::rotation(-self.angle))
            .mul(&Mat3::translation(-self.center.x, -self.center.y))
    }

    /// Graph-to-screen transform for a `width` x `height` viewport, with
    /// the origin at the top-left corner.
    pub fn screen_matrix(&self, width: f32, height: f32) -> Mat3 {
        Mat3::translation(width / 2.0, height / 2.0).mul(&self.matrix())
    }

    /// Graph-space bounding rectangle of the visible viewport. Exact for
    /// axis-aligned cameras; for rotated ones this is the bounding box of
    /// the rotated viewport, which over-approximates.
    pub fn visible_rect(&self, width: f32, height: f32) -> Rect {
        let half = Vec2::new(width / 2.0, height / 2.0);
        let corners = [
            Vec2::ZERO,
            Vec2::new(width, 0.0),
            Vec2::new(0.0, height),
            Vec2::new(width, height),
        ]
        .map(|s| self.center + self.rotate((s - half) * self.ratio));
        Rect::bounding(&corners)
    }

    /// Bakes screen positions and sizes into each node's view coordinates.
    ///
    /// `view.size` follows the power-law contract used by the shaders:
    /// `size / ratio^nodes_pow_ratio`, so labels and picking agree with
    /// what the node passes draw.
    pub fn apply_view(
        &self,
        graph: &mut GraphStore,
        width: f32,
        height: f32,
        nodes_pow_ratio: f32,
    ) {
        let matrix = self.screen_matrix(width, height);
        let size_scale = 1.0 / self.ratio.powf(nodes_pow_ratio);
        for node in graph.nodes_mut() {
            let p = matrix.transform_point(Vec2::new(node.x, node.y));
            node.view.x = p.x;
            node.view.y = p.y;
            node.view.size = node.size * size_scale;
        }
    }

    #[inline]
    fn rotate(&self, v: Vec2) -> Vec2 {
        let (s, c) = self.angle.sin_cos();
        Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
    }
}
