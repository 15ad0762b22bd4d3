//! Packed float attribute storage for one style group.

/// Flat f32 attribute block with a fixed per-element stride.
///
/// Invariant: `data.len() == element_count * points * attributes` at all
/// times. Construction zero-fills, so a slot that is never encoded draws
/// as degenerate (invisible) primitives rather than garbage.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffer {
    data: Vec<f32>,
    element_count: usize,
    points: usize,
    attributes: usize,
}

impl AttributeBuffer {
    /// Zero-filled buffer for `element_count` elements of a style whose
    /// descriptor advertises `points` vertices of `attributes` floats.
    pub fn for_elements(element_count: usize, points: usize, attributes: usize) -> Self {
        Self {
            data: vec![0.0; element_count * points * attributes],
            element_count,
            points,
            attributes,
        }
    }

    /// Floats per element.
    #[inline]
    pub fn stride(&self) -> usize {
        self.points * self.attributes
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    #[inline]
    pub fn points(&self) -> usize {
        self.points
    }

    #[inline]
    pub fn attributes(&self) -> usize {
        self.attributes
    }

    /// Total vertex count across all elements.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.element_count * self.points
    }

    /// Mutable slot for one element, exactly `stride()` floats.
    ///
    /// Panics when `index` is out of range; the builder iterates its own
    /// member list so that cannot happen from safe callers.
    #[inline]
    pub fn slot(&mut self, index: usize) -> &mut [f32] {
        let stride = self.stride();
        let start = index * stride;
        &mut self.data[start..start + stride]
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
