//! Time-sliced edge drawing.
//!
//! Large edge sets are drawn a window at a time across frames instead
//! of in one call. A job owns a cursor over every edge group in the
//! layer set and hands back one window per tick; the renderer
//! accumulates the resulting draws on a separate target so finished
//! windows persist while the job runs.

use log::debug;
use skein_graph::GraphStore;

use crate::layer::{Category, LayerSet};
use crate::schedule::scheduler::active_runs;
use crate::style::DrawRange;

/// Lifecycle of an [`EdgeBatchJob`].
///
/// `Created` and `Running` are live; `Completed` and `Cancelled` are
/// terminal and a terminal job never yields work again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Built but not ticked yet.
    Created,
    /// At least one tick has run and windows remain.
    Running,
    /// Every window was handed out.
    Completed,
    /// Stopped early, either explicitly or by a layer rebuild.
    Cancelled,
}

/// One tick's worth of edge drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDraw {
    /// Layer index into the layer set the job was created against.
    pub layer: usize,
    /// Group index within that layer.
    pub group: usize,
    /// The element window this tick covered, drawable or not.
    pub window: DrawRange,
    /// Drawable runs within the window, in element order.
    pub runs: Vec<DrawRange>,
}

/// Cooperative cursor over all edge groups of one layer set build.
///
/// The job is stamped with the layer set's epoch at creation. Ticking
/// against a rebuilt layer set cancels the job instead of drawing,
/// since its cursor would address buffers that no longer exist.
#[derive(Debug)]
pub struct EdgeBatchJob {
    epoch: u64,
    batch: usize,
    layer: usize,
    group: usize,
    start: usize,
    state: JobState,
}

impl EdgeBatchJob {
    /// Creates a job positioned at the first edge group.
    ///
    /// Returns `None` when the layer set has no edge layers, so callers
    /// never hold a job that completes without ever producing work.
    pub fn new(layers: &LayerSet, batch: usize) -> Option<Self> {
        let (layer, group) = first_edge_group(layers, 0)?;
        Some(Self {
            epoch: layers.epoch(),
            batch: batch.max(1),
            layer,
            group,
            start: 0,
            state: JobState::Created,
        })
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// True once the job will never yield again.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Completed | JobState::Cancelled)
    }

    /// Stops a live job. Terminal states are left as they are, so a
    /// completed job never reports itself cancelled.
    pub fn cancel(&mut self) {
        if matches!(self.state, JobState::Created | JobState::Running) {
            self.state = JobState::Cancelled;
        }
    }

    /// Advances the cursor by one window and returns the draws for it.
    ///
    /// Visibility is evaluated per tick, so edges hidden after the
    /// build are skipped while the slots they occupy still count
    /// against the window. A group of `m` elements therefore always
    /// takes `ceil(m / batch)` ticks regardless of visibility.
    pub fn tick(&mut self, layers: &LayerSet, graph: &GraphStore) -> Option<BatchDraw> {
        if self.is_finished() {
            return None;
        }
        if layers.epoch() != self.epoch {
            debug!(
                "edge batch job cancelled: layer epoch {} superseded by {}",
                self.epoch,
                layers.epoch()
            );
            self.state = JobState::Cancelled;
            return None;
        }
        self.state = JobState::Running;

        let Some(group) = layers
            .layers()
            .get(self.layer)
            .and_then(|layer| layer.groups.get(self.group))
        else {
            self.state = JobState::Cancelled;
            return None;
        };

        let len = group.members.len();
        let end = (self.start + self.batch).min(len);
        let draw = BatchDraw {
            layer: self.layer,
            group: self.group,
            window: DrawRange::new(self.start, end - self.start),
            runs: active_runs(group, self.start..end, graph),
        };

        if end < len {
            self.start = end;
        } else if self.group + 1 < layers.layers()[self.layer].groups.len() {
            self.group += 1;
            self.start = 0;
        } else if let Some((layer, group)) = first_edge_group(layers, self.layer + 1) {
            self.layer = layer;
            self.group = group;
            self.start = 0;
        } else {
            self.state = JobState::Completed;
        }
        Some(draw)
    }
}

/// First edge layer at or after `from`, with its first group.
fn first_edge_group(layers: &LayerSet, from: usize) -> Option<(usize, usize)> {
    layers
        .layers()
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, layer)| layer.category == Category::Edge && !layer.groups.is_empty())
        .map(|(index, _)| (index, 0))
}

/// Holder for the at-most-one live job per renderer.
///
/// Replacing or dropping the slot's job cancels it first, so a job can
/// never outlive the decision that scheduled it.
#[derive(Debug, Default)]
pub struct JobSlot {
    job: Option<EdgeBatchJob>,
}

impl JobSlot {
    /// Cancels any live job and installs `job` in its place.
    pub fn replace(&mut self, job: Option<EdgeBatchJob>) {
        self.cancel();
        self.job = job;
    }

    /// Cancels and drops the current job, if any.
    pub fn cancel(&mut self) {
        if let Some(job) = self.job.as_mut() {
            job.cancel();
        }
        self.job = None;
    }

    /// True while a live job still has windows to hand out.
    pub fn is_active(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Ticks the current job, dropping it once it reaches a terminal
    /// state.
    pub fn tick(&mut self, layers: &LayerSet, graph: &GraphStore) -> Option<BatchDraw> {
        let job = self.job.as_mut()?;
        let draw = job.tick(layers, graph);
        if job.is_finished() {
            self.job = None;
        }
        draw
    }
}

// ── tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::style::StyleRegistry;
    use skein_graph::{Edge, Node};

    fn line_fan(edge_count: usize) -> GraphStore {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("hub", 0.0, 0.0)).unwrap();
        for i in 0..edge_count {
            let leaf = format!("n{i}");
            graph
                .add_node(Node::new(&leaf, i as f32 + 1.0, 0.0))
                .unwrap();
            graph
                .add_edge(Edge::new(format!("e{i}"), "hub", &leaf))
                .unwrap();
        }
        graph
    }

    fn built(graph: &GraphStore) -> LayerSet {
        let registry = StyleRegistry::builtin();
        let mut layers = LayerSet::new();
        layers.rebuild(graph, &registry, &Settings::default());
        layers
    }

    #[test]
    fn tick_count_is_ceiling_of_elements_over_batch() {
        let graph = line_fan(5);
        let layers = built(&graph);
        let mut job = EdgeBatchJob::new(&layers, 2).unwrap();
        assert_eq!(job.state(), JobState::Created);

        assert!(job.tick(&layers, &graph).is_some());
        assert_eq!(job.state(), JobState::Running);
        assert!(job.tick(&layers, &graph).is_some());
        assert!(job.tick(&layers, &graph).is_some());
        assert_eq!(job.state(), JobState::Completed);
        assert!(job.tick(&layers, &graph).is_none());
    }

    #[test]
    fn windows_partition_the_group_without_overlap() {
        let graph = line_fan(7);
        let layers = built(&graph);
        let mut job = EdgeBatchJob::new(&layers, 3).unwrap();

        let mut next = 0;
        while let Some(draw) = job.tick(&layers, &graph) {
            assert_eq!(draw.window.first, next);
            next = draw.window.end();
        }
        assert_eq!(next, 7);
    }

    #[test]
    fn oversized_batch_completes_in_a_single_tick() {
        let graph = line_fan(3);
        let layers = built(&graph);
        let mut job = EdgeBatchJob::new(&layers, 100).unwrap();

        let draw = job.tick(&layers, &graph).unwrap();
        assert_eq!(draw.window, DrawRange::new(0, 3));
        assert_eq!(job.state(), JobState::Completed);
    }

    #[test]
    fn cursor_crosses_groups_and_layers() {
        let mut graph = line_fan(2);
        graph
            .add_edge(Edge::new("styled", "hub", "n0").with_style("arrow"))
            .unwrap();
        graph
            .add_edge(Edge::new("deep", "hub", "n1").with_z(1.0))
            .unwrap();
        let layers = built(&graph);

        let mut job = EdgeBatchJob::new(&layers, 10).unwrap();
        let mut visited = Vec::new();
        while let Some(draw) = job.tick(&layers, &graph) {
            visited.push((draw.layer, draw.group, draw.window.count));
        }

        // Three visits: the z=1 layer's single group, then both style
        // groups of the z=0 layer, every element accounted for.
        assert_eq!(visited.len(), 3);
        let total: usize = visited.iter().map(|&(_, _, count)| count).sum();
        assert_eq!(total, graph.edge_count());
        assert!(visited.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn hidden_edges_thin_runs_but_not_windows() {
        let mut graph = line_fan(4);
        let layers = built(&graph);
        graph.set_edge_hidden("e1", true);

        let mut job = EdgeBatchJob::new(&layers, 4).unwrap();
        let draw = job.tick(&layers, &graph).unwrap();
        assert_eq!(draw.window, DrawRange::new(0, 4));
        assert_eq!(draw.runs, vec![DrawRange::new(0, 1), DrawRange::new(2, 2)]);
    }

    #[test]
    fn cancel_is_terminal_and_sticky() {
        let graph = line_fan(4);
        let layers = built(&graph);
        let mut job = EdgeBatchJob::new(&layers, 1).unwrap();

        job.tick(&layers, &graph);
        job.cancel();
        assert_eq!(job.state(), JobState::Cancelled);
        assert!(job.tick(&layers, &graph).is_none());

        // Cancelling a completed job must not rewrite history.
        let mut done = EdgeBatchJob::new(&layers, 100).unwrap();
        done.tick(&layers, &graph);
        assert_eq!(done.state(), JobState::Completed);
        done.cancel();
        assert_eq!(done.state(), JobState::Completed);
    }

    #[test]
    fn rebuild_cancels_a_stale_job() {
        let graph = line_fan(4);
        let mut layers = built(&graph);
        let mut job = EdgeBatchJob::new(&layers, 1).unwrap();
        job.tick(&layers, &graph);

        let registry = StyleRegistry::builtin();
        layers.rebuild(&graph, &registry, &Settings::default());
        assert!(job.tick(&layers, &graph).is_none());
        assert_eq!(job.state(), JobState::Cancelled);
    }

    #[test]
    fn no_edges_means_no_job() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("solo", 0.0, 0.0)).unwrap();
        let layers = built(&graph);
        assert!(EdgeBatchJob::new(&layers, 8).is_none());
    }

    #[test]
    fn slot_replaces_and_drains() {
        let graph = line_fan(3);
        let layers = built(&graph);

        let mut slot = JobSlot::default();
        assert!(!slot.is_active());
        assert!(slot.tick(&layers, &graph).is_none());

        slot.replace(EdgeBatchJob::new(&layers, 2));
        assert!(slot.is_active());
        assert!(slot.tick(&layers, &graph).is_some());
        assert!(slot.tick(&layers, &graph).is_some());
        assert!(!slot.is_active());
        assert!(slot.tick(&layers, &graph).is_none());
    }
}
