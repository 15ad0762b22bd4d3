//! The layer builder itself.

use skein_graph::GraphStore;

use crate::layer::buffer::AttributeBuffer;
use crate::layer::sort::{Category, SortKey};
use crate::settings::Settings;
use crate::style::{EdgeStyle, NodeStyle, StyleRegistry};

/// One style's worth of drawable elements inside a layer.
#[derive(Debug)]
pub struct StyleGroup {
    /// Resolved style name; always registered in the registry that built
    /// this group.
    pub style: String,
    /// Indices into the graph's node or edge array (per the owning
    /// layer's category), in draw order. Slot `i` of the buffer belongs
    /// to `members[i]`.
    pub members: Vec<usize>,
    pub buffer: AttributeBuffer,
    /// Index data for styles that draw indexed; `None` for the rest.
    pub indices: Option<Vec<u32>>,
}

/// A run of same-depth, same-category groups, drawn back to front.
#[derive(Debug)]
pub struct Layer {
    pub z: f32,
    pub category: Category,
    pub groups: Vec<StyleGroup>,
}

/// All layers for one graph snapshot, plus the epoch that snapshot got.
///
/// The epoch increments on every rebuild. Anything derived from a layer
/// set (uploaded GPU buffers, in-flight batch jobs) records the epoch it
/// saw and treats a mismatch as "my data is gone".
#[derive(Debug)]
pub struct LayerSet {
    layers: Vec<Layer>,
    epoch: u64,
}

impl Default for LayerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSet {
    /// Empty set at epoch 0; nothing references epoch 0 data.
    pub fn new() -> Self {
        Self { layers: Vec::new(), epoch: 0 }
    }

    /// Rebuilds every layer from the current graph contents and bumps the
    /// epoch.
    pub fn rebuild(&mut self, graph: &GraphStore, registry: &StyleRegistry, settings: &Settings) {
        self.epoch = self.epoch.wrapping_add(1);
        self.layers = build_layers(graph, registry, settings);
        log::debug!(
            "layers rebuilt: epoch {}, {} layers, {} groups",
            self.epoch,
            self.layers.len(),
            self.layers.iter().map(|l| l.groups.len()).sum::<usize>(),
        );
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total edge elements across all edge layers, hidden ones included.
    pub fn edge_element_total(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| l.category == Category::Edge)
            .flat_map(|l| l.groups.iter())
            .map(|g| g.members.len())
            .sum()
    }
}

// ── construction ─────────────────────────────────────────────────────────────

enum StyleRef<'r> {
    Node(&'r dyn NodeStyle),
    Edge(&'r dyn EdgeStyle),
}

struct Tagged<'r> {
    key: SortKey<'r>,
    index: usize,
    style: StyleRef<'r>,
}

fn build_layers(graph: &GraphStore, registry: &StyleRegistry, settings: &Settings) -> Vec<Layer> {
    let mut tagged: Vec<Tagged<'_>> = Vec::with_capacity(graph.node_count() + graph.edge_count());

    for (index, node) in graph.nodes().iter().enumerate() {
        let (name, style) =
            registry.resolve_node(node.style.as_deref(), &settings.default_node_style);
        tagged.push(Tagged {
            key: SortKey { z: node.z, category: Category::Node, style: name },
            index,
            style: StyleRef::Node(style),
        });
    }
    for (index, edge) in graph.edges().iter().enumerate() {
        let (name, style) =
            registry.resolve_edge(edge.style.as_deref(), &settings.default_edge_style);
        tagged.push(Tagged {
            key: SortKey { z: edge.z, category: Category::Edge, style: name },
            index,
            style: StyleRef::Edge(style),
        });
    }

    // Stable, so equal keys keep their graph insertion order.
    tagged.sort_by(|a, b| a.key.compare(&b.key));

    let mut layers = Vec::new();
    let mut i = 0;
    while i < tagged.len() {
        let layer_key = tagged[i].key;
        let mut groups = Vec::new();
        while i < tagged.len() && tagged[i].key.same_layer(&layer_key) {
            let style_name = tagged[i].key.style;
            let start = i;
            while i < tagged.len()
                && tagged[i].key.same_layer(&layer_key)
                && tagged[i].key.style == style_name
            {
                i += 1;
            }
            groups.push(build_group(&tagged[start..i], graph, settings));
        }
        layers.push(Layer { z: layer_key.z, category: layer_key.category, groups });
    }
    layers
}

/// Encodes one homogeneous run (same layer, same style) into a group.
fn build_group(run: &[Tagged<'_>], graph: &GraphStore, settings: &Settings) -> StyleGroup {
    let members: Vec<usize> = run.iter().map(|t| t.index).collect();
    let style_name = run[0].key.style.to_owned();

    match run[0].style {
        StyleRef::Node(style) => {
            let mut buffer =
                AttributeBuffer::for_elements(run.len(), style.points(), style.attributes());
            for (slot, &index) in members.iter().enumerate() {
                let node = &graph.nodes()[index];
                if !node.hidden {
                    style.encode_node(node, buffer.slot(slot), settings);
                }
            }
            let indices = style.compute_indices(&buffer);
            StyleGroup { style: style_name, members, buffer, indices }
        }
        StyleRef::Edge(style) => {
            let mut buffer =
                AttributeBuffer::for_elements(run.len(), style.points(), style.attributes());
            for (slot, &index) in members.iter().enumerate() {
                let edge = &graph.edges()[index];
                if graph.edge_visible(edge) {
                    if let Some((source, target)) = graph.endpoints(edge) {
                        style.encode_edge(edge, source, target, buffer.slot(slot), settings);
                    }
                }
            }
            let indices = style.compute_indices(&buffer);
            StyleGroup { style: style_name, members, buffer, indices }
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use skein_graph::{Edge, Node};

    use super::*;
    use crate::style::StyleRegistry;

    fn registry() -> StyleRegistry {
        StyleRegistry::builtin()
    }

    fn settings() -> Settings {
        Settings::default()
    }

    /// Minimal custom node style used to check grouping and the plugin
    /// seam: one point, two attributes, encodes the raw position.
    struct DotStyle;

    impl NodeStyle for DotStyle {
        fn points(&self) -> usize {
            1
        }
        fn attributes(&self) -> usize {
            2
        }
        fn encode_node(&self, node: &Node, out: &mut [f32], _settings: &Settings) {
            out[0] = node.x;
            out[1] = node.y;
        }
        fn build_program(
            &self,
            _device: &wgpu::Device,
            _format: wgpu::TextureFormat,
        ) -> Result<crate::program::StyleProgram, crate::style::ProgramError> {
            Err(crate::style::ProgramError::new("dot", "test style has no program"))
        }
        fn write_uniforms(
            &self,
            _queue: &wgpu::Queue,
            _program: &crate::program::StyleProgram,
            _params: &crate::style::DrawParams<'_>,
        ) {
        }
        fn draw(
            &self,
            _pass: &mut wgpu::RenderPass<'_>,
            _program: &crate::program::StyleProgram,
            _group: &crate::layer::GpuGroup,
            _range: crate::style::DrawRange,
        ) {
        }
    }

    #[test]
    fn empty_graph_builds_no_layers() {
        let graph = GraphStore::new();
        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());
        assert!(set.is_empty());
        assert_eq!(set.epoch(), 1);
    }

    #[test]
    fn epoch_increments_on_every_rebuild() {
        let graph = GraphStore::new();
        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());
        set.rebuild(&graph, &registry(), &settings());
        assert_eq!(set.epoch(), 2);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0).with_z(1.0)).unwrap();
        graph.add_node(Node::new("b", 5.0, 5.0)).unwrap();
        graph.add_edge(Edge::new("e", "a", "b")).unwrap();

        let mut first = LayerSet::new();
        first.rebuild(&graph, &registry(), &settings());
        let mut second = LayerSet::new();
        second.rebuild(&graph, &registry(), &settings());

        assert_eq!(first.layers().len(), second.layers().len());
        for (a, b) in first.layers().iter().zip(second.layers().iter()) {
            assert_eq!(a.z, b.z);
            assert_eq!(a.category, b.category);
            assert_eq!(a.groups.len(), b.groups.len());
            for (ga, gb) in a.groups.iter().zip(b.groups.iter()) {
                assert_eq!(ga.style, gb.style);
                assert_eq!(ga.members, gb.members);
                assert_eq!(ga.buffer.data(), gb.buffer.data());
            }
        }
    }

    #[test]
    fn depth_orders_layers_and_interleaves_categories() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("deep", 0.0, 0.0).with_z(3.0)).unwrap();
        graph.add_node(Node::new("mid", 1.0, 0.0).with_z(2.0)).unwrap();
        graph.add_node(Node::new("near", 2.0, 0.0).with_z(1.0)).unwrap();
        graph.add_edge(Edge::new("e", "deep", "mid").with_z(2.0)).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());

        let shape: Vec<(f32, Category)> =
            set.layers().iter().map(|l| (l.z, l.category)).collect();
        assert_eq!(
            shape,
            vec![
                (3.0, Category::Node),
                (2.0, Category::Edge),
                (2.0, Category::Node),
                (1.0, Category::Node),
            ],
        );
    }

    #[test]
    fn hidden_nodes_keep_zeroed_slots() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("shown", 1.0, 1.0).with_size(4.0)).unwrap();
        graph.add_node(Node::new("ghost", 2.0, 2.0).with_size(4.0).with_hidden(true)).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());

        let group = &set.layers()[0].groups[0];
        assert_eq!(group.members, vec![0, 1]);
        let stride = group.buffer.stride();
        let data = group.buffer.data();
        assert!(data[..stride].iter().any(|v| *v != 0.0), "visible slot encoded");
        assert!(data[stride..].iter().all(|v| *v == 0.0), "hidden slot untouched");
    }

    #[test]
    fn hidden_endpoint_zeroes_the_edge_slot() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("b", 9.0, 9.0).with_hidden(true)).unwrap();
        graph.add_node(Node::new("c", 4.0, 4.0)).unwrap();
        graph.add_edge(Edge::new("dead", "a", "b")).unwrap();
        graph.add_edge(Edge::new("live", "a", "c")).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());

        let edge_layer = set
            .layers()
            .iter()
            .find(|l| l.category == Category::Edge)
            .expect("edge layer");
        let group = &edge_layer.groups[0];
        assert_eq!(group.buffer.element_count(), 2);
        let stride = group.buffer.stride();
        assert!(group.buffer.data()[..stride].iter().all(|v| *v == 0.0));
        assert!(group.buffer.data()[stride..].iter().any(|v| *v != 0.0));
    }

    #[test]
    fn unknown_style_falls_back_to_default() {
        let mut graph = GraphStore::new();
        graph
            .add_node(Node::new("n", 0.0, 0.0).with_style("no-such-style"))
            .unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());
        assert_eq!(set.layers()[0].groups[0].style, "disc");
    }

    #[test]
    fn styles_split_into_contiguous_groups() {
        let mut reg = registry();
        reg.register_node("dot", Box::new(DotStyle)).unwrap();

        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("b", 1.0, 0.0).with_style("dot")).unwrap();
        graph.add_node(Node::new("c", 2.0, 0.0)).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &reg, &settings());

        assert_eq!(set.layers().len(), 1);
        let groups = &set.layers()[0].groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].style, "disc");
        assert_eq!(groups[0].members, vec![0, 2]);
        assert_eq!(groups[1].style, "dot");
        assert_eq!(groups[1].members, vec![1]);
        assert_eq!(groups[1].buffer.stride(), 2);
        assert_eq!(groups[1].buffer.data(), &[1.0, 0.0]);
    }

    #[test]
    fn line_style_populates_index_data() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("b", 10.0, 0.0)).unwrap();
        graph.add_edge(Edge::new("e", "a", "b").with_style("line")).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());

        let edge_layer = set
            .layers()
            .iter()
            .find(|l| l.category == Category::Edge)
            .expect("edge layer");
        let indices = edge_layer.groups[0].indices.as_ref().expect("indexed style");
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn edge_element_total_counts_hidden_members() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("b", 1.0, 0.0)).unwrap();
        graph.add_edge(Edge::new("e1", "a", "b")).unwrap();
        graph.add_edge(Edge::new("e2", "b", "a").with_hidden(true)).unwrap();

        let mut set = LayerSet::new();
        set.rebuild(&graph, &registry(), &settings());
        assert_eq!(set.edge_element_total(), 2);
    }
}
