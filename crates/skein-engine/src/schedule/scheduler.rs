//! Synchronous frame planning.
//!
//! A plan is the ordered list of group draws for one frame. Order is
//! exactly layer order, so depth within the frame comes entirely from
//! the layer builder and the executor never re-sorts anything.

use std::ops::Range;

use skein_graph::GraphStore;

use crate::layer::{Category, LayerSet, StyleGroup};
use crate::settings::Settings;
use crate::style::DrawRange;

/// One draw the renderer should issue, addressed by group coordinates
/// into the [`LayerSet`] that produced the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOp {
    /// Draw a node group over a contiguous element range.
    ///
    /// Hidden nodes occupy zero-filled slots, so the whole group is
    /// drawn in one call and the degenerate geometry never rasterizes.
    NodeGroup {
        layer: usize,
        group: usize,
        range: DrawRange,
    },
    /// Draw the active runs of an edge group.
    ///
    /// Edges re-check visibility at plan time because an endpoint may
    /// have been hidden after the layer build.
    EdgeGroup {
        layer: usize,
        group: usize,
        runs: Vec<DrawRange>,
    },
}

/// Computes the maximal contiguous runs of drawable edges inside
/// `window` (element indices into `group.members`).
///
/// An edge is drawable when itself and both endpoints are visible. The
/// same predicate gates encoding at build time; re-evaluating it here
/// picks up visibility flips that happened since, at the cost of
/// drawing stale zero slots for newly shown edges until a rebuild.
pub fn active_runs(group: &StyleGroup, window: Range<usize>, graph: &GraphStore) -> Vec<DrawRange> {
    let mut runs = Vec::new();
    let mut run_start = None;
    for slot in window.clone() {
        let drawable = group
            .members
            .get(slot)
            .and_then(|&edge_index| graph.edges().get(edge_index))
            .is_some_and(|edge| graph.edge_visible(edge));
        match (drawable, run_start) {
            (true, None) => run_start = Some(slot),
            (false, Some(start)) => {
                runs.push(DrawRange::new(start, slot - start));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(DrawRange::new(start, window.end - start));
    }
    runs
}

/// Builds the synchronous plan for one frame.
///
/// Node groups always draw when `draw_nodes` is set. Edge groups draw
/// when `draw_edges` is set, the camera gate allows them, and batching
/// is off; with batching on, edge work is deferred to an
/// [`EdgeBatchJob`](crate::schedule::EdgeBatchJob) and excluded here so
/// no edge is ever drawn twice in a frame.
pub fn plan_sync(
    layers: &LayerSet,
    graph: &GraphStore,
    settings: &Settings,
    camera_moving: bool,
) -> Vec<PlanOp> {
    let draw_edges =
        settings.draw_edges && !(settings.hide_edges_on_move && camera_moving);
    let edges_sync = draw_edges && !settings.batch_edges_drawing;

    let mut plan = Vec::new();
    for (layer_index, layer) in layers.layers().iter().enumerate() {
        match layer.category {
            Category::Edge => {
                if !edges_sync {
                    continue;
                }
                for (group_index, group) in layer.groups.iter().enumerate() {
                    let runs = active_runs(group, 0..group.members.len(), graph);
                    if runs.is_empty() {
                        continue;
                    }
                    plan.push(PlanOp::EdgeGroup {
                        layer: layer_index,
                        group: group_index,
                        runs,
                    });
                }
            }
            Category::Node => {
                if !settings.draw_nodes {
                    continue;
                }
                for (group_index, group) in layer.groups.iter().enumerate() {
                    if group.members.is_empty() {
                        continue;
                    }
                    plan.push(PlanOp::NodeGroup {
                        layer: layer_index,
                        group: group_index,
                        range: DrawRange::new(0, group.members.len()),
                    });
                }
            }
        }
    }
    plan
}

// ── tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleRegistry;
    use skein_graph::{Edge, Node};

    fn sample_graph() -> GraphStore {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("b", 1.0, 0.0)).unwrap();
        graph.add_node(Node::new("c", 2.0, 0.0)).unwrap();
        graph.add_edge(Edge::new("ab", "a", "b")).unwrap();
        graph.add_edge(Edge::new("bc", "b", "c")).unwrap();
        graph.add_edge(Edge::new("ca", "c", "a")).unwrap();
        graph
    }

    fn built(graph: &GraphStore) -> LayerSet {
        let registry = StyleRegistry::builtin();
        let mut layers = LayerSet::new();
        layers.rebuild(graph, &registry, &Settings::default());
        layers
    }

    #[test]
    fn plan_preserves_layer_order() {
        let graph = sample_graph();
        let layers = built(&graph);
        let plan = plan_sync(&layers, &graph, &Settings::default(), false);

        let coords: Vec<usize> = plan
            .iter()
            .map(|op| match op {
                PlanOp::NodeGroup { layer, .. } | PlanOp::EdgeGroup { layer, .. } => *layer,
            })
            .collect();
        let mut sorted = coords.clone();
        sorted.sort_unstable();
        assert_eq!(coords, sorted);

        assert!(matches!(plan.first(), Some(PlanOp::EdgeGroup { .. })));
        assert!(matches!(plan.last(), Some(PlanOp::NodeGroup { .. })));
    }

    #[test]
    fn hidden_edge_splits_runs() {
        let mut graph = sample_graph();
        let layers = built(&graph);
        graph.set_edge_hidden("bc", true);

        let plan = plan_sync(&layers, &graph, &Settings::default(), false);
        let runs = plan
            .iter()
            .find_map(|op| match op {
                PlanOp::EdgeGroup { runs, .. } => Some(runs.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(runs, vec![DrawRange::new(0, 1), DrawRange::new(2, 1)]);
    }

    #[test]
    fn hiding_an_endpoint_drops_its_edges() {
        let mut graph = sample_graph();
        let layers = built(&graph);
        graph.set_node_hidden("a", true);

        let plan = plan_sync(&layers, &graph, &Settings::default(), false);
        let runs = plan
            .iter()
            .find_map(|op| match op {
                PlanOp::EdgeGroup { runs, .. } => Some(runs.clone()),
                _ => None,
            })
            .unwrap();
        // "ab" and "ca" touch the hidden node, only "bc" survives.
        assert_eq!(runs, vec![DrawRange::new(1, 1)]);
    }

    #[test]
    fn toggles_remove_whole_categories() {
        let graph = sample_graph();
        let layers = built(&graph);

        let mut settings = Settings::default();
        settings.draw_edges = false;
        let plan = plan_sync(&layers, &graph, &settings, false);
        assert!(plan.iter().all(|op| matches!(op, PlanOp::NodeGroup { .. })));

        let mut settings = Settings::default();
        settings.draw_nodes = false;
        let plan = plan_sync(&layers, &graph, &settings, false);
        assert!(plan.iter().all(|op| matches!(op, PlanOp::EdgeGroup { .. })));
    }

    #[test]
    fn moving_camera_gates_edges_when_configured() {
        let graph = sample_graph();
        let layers = built(&graph);
        let mut settings = Settings::default();
        settings.hide_edges_on_move = true;

        let moving = plan_sync(&layers, &graph, &settings, true);
        assert!(moving.iter().all(|op| matches!(op, PlanOp::NodeGroup { .. })));

        let settled = plan_sync(&layers, &graph, &settings, false);
        assert!(settled.iter().any(|op| matches!(op, PlanOp::EdgeGroup { .. })));
    }

    #[test]
    fn batching_excludes_edges_from_the_sync_plan() {
        let graph = sample_graph();
        let layers = built(&graph);
        let mut settings = Settings::default();
        settings.batch_edges_drawing = true;

        let plan = plan_sync(&layers, &graph, &settings, false);
        assert!(plan.iter().all(|op| matches!(op, PlanOp::NodeGroup { .. })));
    }

    #[test]
    fn runs_cover_fully_visible_window_in_one_piece() {
        let graph = sample_graph();
        let layers = built(&graph);
        let group = layers
            .layers()
            .iter()
            .find(|layer| layer.category == Category::Edge)
            .map(|layer| &layer.groups[0])
            .unwrap();

        let runs = active_runs(group, 0..group.members.len(), &graph);
        assert_eq!(runs, vec![DrawRange::new(0, 3)]);

        let tail = active_runs(group, 1..3, &graph);
        assert_eq!(tail, vec![DrawRange::new(1, 2)]);
    }
}
