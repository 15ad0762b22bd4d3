//! Small 2D math kit shared by the camera, the layer builder and the
//! geometry encoders.
//!
//! Everything here works in f32 because the values end up in vertex
//! buffers and uniform blocks unchanged. The matrix type is a 3x3
//! homogeneous transform stored column-major, which is the layout both
//! the CPU-side math and the WGSL `mat3x3<f32>` agree on.

use std::ops::{Add, Mul, Neg, Sub};

// ── vectors ──────────────────────────────────────────────────────────────────

/// 2D vector / point in graph or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Counter-clockwise perpendicular.
    #[inline]
    pub const fn perp(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ── rectangles ───────────────────────────────────────────────────────────────

/// Axis-aligned rectangle, used for viewport culling of labels and for
/// describing the visible region of graph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle spanning `origin .. origin + size`.
    #[inline]
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { min: origin, max: origin + size }
    }

    /// Smallest rectangle containing every given point.
    ///
    /// Returns a degenerate rect at the origin when `points` is empty.
    pub fn bounding(points: &[Vec2]) -> Self {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        if points.is_empty() {
            return Self::new(Vec2::ZERO, Vec2::ZERO);
        }
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Rectangle grown by `margin` on every side. Negative margins shrink;
    /// the result is not re-normalized.
    #[inline]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: Vec2::new(self.min.x - margin, self.min.y - margin),
            max: Vec2::new(self.max.x + margin, self.max.y + margin),
        }
    }
}

// ── matrices ─────────────────────────────────────────────────────────────────

/// Column-major 3x3 homogeneous 2D transform.
///
/// `m[col * 3 + row]`. Points transform as `M * [x, y, 1]`, so composition
/// reads right to left: `a.mul(&b)` applies `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub m: [f32; 9],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 { m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] };

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Mat3 { m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, x, y, 1.0] }
    }

    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3 { m: [c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0] }
    }

    #[inline]
    pub const fn scaling(s: f32) -> Self {
        Mat3 { m: [s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 1.0] }
    }

    /// `self * rhs` (apply `rhs` first).
    pub fn mul(&self, rhs: &Mat3) -> Mat3 {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0f32; 9];
        for col in 0..3 {
            for row in 0..3 {
                out[col * 3 + row] = a[row] * b[col * 3]
                    + a[3 + row] * b[col * 3 + 1]
                    + a[6 + row] * b[col * 3 + 2];
            }
        }
        Mat3 { m: out }
    }

    /// Transforms a point (w = 1).
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.m;
        Vec2::new(
            m[0] * p.x + m[3] * p.y + m[6],
            m[1] * p.x + m[4] * p.y + m[7],
        )
    }

    /// Columns padded to vec4 for a WGSL `mat3x3<f32>` uniform, which is
    /// laid out as three 16-byte columns.
    #[inline]
    pub fn to_gpu(&self) -> [[f32; 4]; 3] {
        let m = &self.m;
        [
            [m[0], m[1], m[2], 0.0],
            [m[3], m[4], m[5], 0.0],
            [m[6], m[7], m[8], 0.0],
        ]
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
