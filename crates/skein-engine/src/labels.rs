//! Label collection for the host's text pass.
//!
//! Text rasterization stays on the host side; the renderer only decides
//! which labels are worth drawing this frame and where. Collection runs
//! off the camera-applied view coordinates, so it is only as fresh as
//! the last apply-view pass.

use skein_graph::GraphStore;

use crate::geom::{Rect, Vec2};

/// One label with its anchor in screen coordinates.
///
/// `size` is the node's camera-scaled display size; hosts typically
/// derive font size and anchor offset from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Host-provided receiver for each frame's labels.
pub trait LabelSink {
    fn draw_labels(&mut self, labels: &[LabelItem]);
}

/// Collects labels for visible labeled nodes inside the viewport grown
/// by `margin` screen pixels on every side.
///
/// The margin keeps text attached to a node that sits just off screen;
/// without it, a label overhanging the edge would pop in and out as its
/// node crosses the boundary.
pub fn collect_labels(
    graph: &GraphStore,
    width: f32,
    height: f32,
    margin: f32,
) -> Vec<LabelItem> {
    let bounds = Rect::new(Vec2::ZERO, Vec2::new(width, height)).expanded(margin);
    graph
        .nodes()
        .iter()
        .filter(|node| !node.hidden)
        .filter_map(|node| {
            let text = node.label.as_ref()?;
            let anchor = Vec2::new(node.view.x, node.view.y);
            if !bounds.contains(anchor) {
                return None;
            }
            Some(LabelItem {
                text: text.clone(),
                x: anchor.x,
                y: anchor.y,
                size: node.view.size,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use skein_graph::Node;

    use super::*;
    use crate::camera::Camera;

    fn labeled(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, x, y).with_label(id.to_uppercase())
    }

    fn applied(graph: &mut GraphStore, width: f32, height: f32) {
        Camera::new().apply_view(graph, width, height, 0.5);
    }

    #[test]
    fn collects_only_labeled_visible_nodes() {
        let mut graph = GraphStore::new();
        graph.add_node(labeled("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("mute", 1.0, 1.0)).unwrap();
        graph.add_node(labeled("ghost", 2.0, 2.0).with_hidden(true)).unwrap();
        applied(&mut graph, 100.0, 100.0);

        let labels = collect_labels(&graph, 100.0, 100.0, 0.0);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "A");
    }

    #[test]
    fn culls_outside_the_expanded_viewport() {
        let mut graph = GraphStore::new();
        // Viewport 100x100 around graph origin: screen x = 50 + graph x.
        graph.add_node(labeled("in", 0.0, 0.0)).unwrap();
        graph.add_node(labeled("near", 70.0, 0.0)).unwrap();
        graph.add_node(labeled("far", 500.0, 0.0)).unwrap();
        applied(&mut graph, 100.0, 100.0);

        let tight = collect_labels(&graph, 100.0, 100.0, 0.0);
        assert_eq!(tight.len(), 1);

        // A 50 px margin admits the node 20 px past the right edge.
        let lenient = collect_labels(&graph, 100.0, 100.0, 50.0);
        let texts: Vec<_> = lenient.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["IN", "NEAR"]);
    }

    #[test]
    fn anchor_and_size_come_from_view_coords() {
        let mut graph = GraphStore::new();
        graph.add_node(labeled("n", 10.0, -10.0).with_size(9.0)).unwrap();
        let mut camera = Camera::new();
        camera.set_ratio(9.0);
        camera.apply_view(&mut graph, 200.0, 200.0, 0.5);

        let labels = collect_labels(&graph, 200.0, 200.0, 0.0);
        let item = &labels[0];
        let view = &graph.node("n").unwrap().view;
        assert_eq!((item.x, item.y), (view.x, view.y));
        // 9 / 9^0.5 = 3
        assert!((item.size - 3.0).abs() < 1e-4);
    }
}
