use crate::color::Rgba;

/// Geometric outline of a node, as far as edge geometry cares.
///
/// Arrow heads stop at the target's boundary, so the effective radius along
/// the approach direction depends on the shape.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum NodeShape {
    #[default]
    Disc,
    Square,
}

impl NodeShape {
    /// Scale factor applied to the node's radius for an edge approaching
    /// along `(dx, dy)`.
    ///
    /// A disc's boundary distance is the radius itself. A square of
    /// half-side `r` extends `r / max(|cos|, |sin|)` along the approach
    /// direction, so the factor is `1 / max(|cos|, |sin|)` (between 1 and √2).
    pub fn radius_scale(self, dx: f32, dy: f32) -> f32 {
        match self {
            NodeShape::Disc => 1.0,
            NodeShape::Square => {
                let len = (dx * dx + dy * dy).sqrt();
                if len <= f32::EPSILON {
                    return 1.0;
                }
                let m = (dx.abs() / len).max(dy.abs() / len);
                if m <= f32::EPSILON { 1.0 } else { 1.0 / m }
            }
        }
    }
}

/// Arrow-head variant carried by directed edges.
///
/// The discriminator value is encoded into the vertex stream and matched by
/// the fragment program's masking logic.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum HeadKind {
    /// Filled triangular head.
    #[default]
    Arrow,
    /// Flat bar head (inhibition notation).
    Inhibitory,
}

impl HeadKind {
    #[inline]
    pub fn discriminant(self) -> f32 {
        match self {
            HeadKind::Arrow => 0.0,
            HeadKind::Inhibitory => 1.0,
        }
    }
}

/// Camera-applied display coordinates, written back by the renderer's
/// apply-view pass.
///
/// These exist for label placement and host-side hit testing; the GPU
/// pipeline itself transforms graph coordinates in the vertex stage and
/// never reads them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewCoords {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// A graph node.
///
/// `x`/`y`/`size` are in graph space; `view` holds the latest camera-applied
/// values. `z` picks the depth tier (lower z renders on top), `style` the
/// visual variant (falls back to the registry default when absent or
/// unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Option<Rgba>,
    pub z: f32,
    pub hidden: bool,
    pub style: Option<String>,
    pub shape: NodeShape,
    pub label: Option<String>,
    pub view: ViewCoords,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            size: 1.0,
            color: None,
            z: 0.0,
            hidden: false,
            style: None,
            shape: NodeShape::Disc,
            label: None,
            view: ViewCoords::default(),
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

/// A directed graph edge from `source` to `target` (node ids).
///
/// `size` is the line thickness in graph units. Head fields only matter to
/// styles that draw arrow heads; tangent angles shear the line body while
/// preserving its visual thickness.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub size: f32,
    pub color: Option<Rgba>,
    pub z: f32,
    pub hidden: bool,
    pub style: Option<String>,
    pub head: HeadKind,
    pub head_size: f32,
    pub tan_head_angle: f32,
    pub tan_tail_angle: f32,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            size: 1.0,
            color: None,
            z: 0.0,
            hidden: false,
            style: None,
            head: HeadKind::Arrow,
            head_size: 1.0,
            tan_head_angle: 0.0,
            tan_tail_angle: 0.0,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_head(mut self, head: HeadKind) -> Self {
        self.head = head;
        self
    }

    pub fn with_head_size(mut self, head_size: f32) -> Self {
        self.head_size = head_size;
        self
    }

    pub fn with_tangents(mut self, tan_head: f32, tan_tail: f32) -> Self {
        self.tan_head_angle = tan_head;
        self.tan_tail_angle = tan_tail;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── NodeShape::radius_scale ───────────────────────────────────────────

    #[test]
    fn disc_scale_is_unity() {
        assert_eq!(NodeShape::Disc.radius_scale(3.0, -4.0), 1.0);
    }

    #[test]
    fn square_scale_axis_aligned() {
        // Along an axis the square boundary sits exactly one radius away.
        assert!((NodeShape::Square.radius_scale(1.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((NodeShape::Square.radius_scale(0.0, -2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn square_scale_diagonal_is_sqrt_two() {
        let s = NodeShape::Square.radius_scale(1.0, 1.0);
        assert!((s - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn degenerate_direction_is_unity() {
        assert_eq!(NodeShape::Square.radius_scale(0.0, 0.0), 1.0);
    }

    // ── constructors ──────────────────────────────────────────────────────

    #[test]
    fn node_defaults() {
        let n = Node::new("n", 1.0, 2.0);
        assert_eq!(n.size, 1.0);
        assert_eq!(n.z, 0.0);
        assert!(!n.hidden);
        assert_eq!(n.shape, NodeShape::Disc);
        assert!(n.style.is_none());
    }

    #[test]
    fn edge_defaults() {
        let e = Edge::new("e", "a", "b");
        assert_eq!(e.head, HeadKind::Arrow);
        assert_eq!(e.head_size, 1.0);
        assert_eq!(e.tan_head_angle, 0.0);
        assert_eq!(e.tan_tail_angle, 0.0);
    }
}
