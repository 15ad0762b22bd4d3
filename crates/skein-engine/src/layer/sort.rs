//! Element ordering for layer construction.

use std::cmp::Ordering;

/// Element kind inside a depth tier.
///
/// The variant order is the draw order: edges render before nodes that
/// share their depth, so endpoints sit on top of their connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Edge,
    Node,
}

/// Composite sort key for one graph element.
///
/// Ordering: depth descending (deepest drawn first), then category, then
/// resolved style name ascending. Depth uses `total_cmp`, so NaN depths
/// sort deterministically instead of poisoning the ordering; equal-depth
/// comparison treats `0.0` and `-0.0` as one tier.
#[derive(Debug, Clone, Copy)]
pub struct SortKey<'a> {
    pub z: f32,
    pub category: Category,
    pub style: &'a str,
}

impl SortKey<'_> {
    pub fn compare(&self, other: &Self) -> Ordering {
        other
            .z
            .total_cmp(&self.z)
            .then(self.category.cmp(&other.category))
            .then(self.style.cmp(other.style))
    }

    /// Whether two keys fall in the same layer (depth and category both
    /// match; style only splits groups inside a layer).
    #[inline]
    pub fn same_layer(&self, other: &Self) -> bool {
        self.z == other.z && self.category == other.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(z: f32, category: Category, style: &str) -> SortKey<'_> {
        SortKey { z, category, style }
    }

    #[test]
    fn deeper_elements_sort_first() {
        let deep = key(5.0, Category::Node, "disc");
        let shallow = key(1.0, Category::Node, "disc");
        assert_eq!(deep.compare(&shallow), Ordering::Less);
    }

    #[test]
    fn edges_precede_nodes_at_equal_depth() {
        let edge = key(2.0, Category::Edge, "arrow");
        let node = key(2.0, Category::Node, "disc");
        assert_eq!(edge.compare(&node), Ordering::Less);
        assert!(!edge.same_layer(&node));
    }

    #[test]
    fn styles_order_ascending_within_a_layer() {
        let a = key(0.0, Category::Node, "disc");
        let b = key(0.0, Category::Node, "square");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert!(a.same_layer(&b));
    }

    #[test]
    fn negative_zero_shares_the_zero_tier() {
        let a = key(0.0, Category::Node, "disc");
        let b = key(-0.0, Category::Node, "disc");
        assert!(a.same_layer(&b));
    }
}
