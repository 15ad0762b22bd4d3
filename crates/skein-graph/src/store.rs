use std::collections::HashMap;
use std::fmt;

use crate::element::{Edge, Node};

/// Structural error raised by [`GraphStore`] mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateNode(String),
    DuplicateEdge(String),
    /// An edge referenced a node id missing from the store.
    MissingEndpoint { edge: String, node: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateNode(id) => write!(f, "node id {id:?} already exists"),
            GraphError::DuplicateEdge(id) => write!(f, "edge id {id:?} already exists"),
            GraphError::MissingEndpoint { edge, node } => {
                write!(f, "edge {edge:?} references unknown node {node:?}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// In-memory node/edge store with id lookup.
///
/// Iteration order is insertion order; the renderer imposes its own depth
/// ordering, so the store never reorders elements. Endpoints are validated
/// at insertion so render paths can assume they resolve.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_ids: HashMap<String, usize>,
    edge_ids: HashMap<String, usize>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_ids.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.node_ids.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edge_ids.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.node_ids.contains_key(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    edge: edge.id,
                    node: endpoint.clone(),
                });
            }
        }
        self.edge_ids.insert(edge.id.clone(), self.edges.len());
        self.edges.push(edge);
        Ok(())
    }

    #[inline]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_ids.get(id).map(|&i| &self.nodes[i])
    }

    #[inline]
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let i = *self.node_ids.get(id)?;
        Some(&mut self.nodes[i])
    }

    #[inline]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_ids.get(id).map(|&i| &self.edges[i])
    }

    #[inline]
    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        let i = *self.edge_ids.get(id)?;
        Some(&mut self.edges[i])
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Resolves an edge's `(source, target)` nodes.
    ///
    /// `None` only occurs for edges not inserted through [`add_edge`]
    /// (endpoints are validated there).
    pub fn endpoints(&self, edge: &Edge) -> Option<(&Node, &Node)> {
        Some((self.node(&edge.source)?, self.node(&edge.target)?))
    }

    /// True when the edge and both endpoints are visible.
    ///
    /// This is the drawability test shared by the layer builder's encode
    /// pass and the scheduler's per-batch active-edge filter.
    pub fn edge_visible(&self, edge: &Edge) -> bool {
        if edge.hidden {
            return false;
        }
        match self.endpoints(edge) {
            Some((s, t)) => !s.hidden && !t.hidden,
            None => false,
        }
    }

    /// Returns whether the node existed.
    pub fn set_node_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Returns whether the edge existed.
    pub fn set_edge_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.edge_mut(id) {
            Some(e) => {
                e.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_ids.clear();
        self.edge_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> GraphStore {
        let mut g = GraphStore::new();
        g.add_node(Node::new("a", 0.0, 0.0)).unwrap();
        g.add_node(Node::new("b", 1.0, 1.0)).unwrap();
        g
    }

    // ── insertion ─────────────────────────────────────────────────────────

    #[test]
    fn duplicate_node_rejected() {
        let mut g = two_nodes();
        assert_eq!(
            g.add_node(Node::new("a", 5.0, 5.0)),
            Err(GraphError::DuplicateNode("a".into()))
        );
    }

    #[test]
    fn edge_requires_existing_endpoints() {
        let mut g = two_nodes();
        let err = g.add_edge(Edge::new("e", "a", "missing")).unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingEndpoint {
                edge: "e".into(),
                node: "missing".into()
            }
        );
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut g = two_nodes();
        g.add_edge(Edge::new("e", "a", "b")).unwrap();
        assert_eq!(
            g.add_edge(Edge::new("e", "b", "a")),
            Err(GraphError::DuplicateEdge("e".into()))
        );
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn endpoints_resolve() {
        let mut g = two_nodes();
        g.add_edge(Edge::new("e", "a", "b")).unwrap();
        let (s, t) = g.endpoints(g.edge("e").unwrap()).unwrap();
        assert_eq!((s.id.as_str(), t.id.as_str()), ("a", "b"));
    }

    #[test]
    fn insertion_order_preserved() {
        let g = two_nodes();
        let ids: Vec<&str> = g.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[test]
    fn edge_visible_tracks_endpoint_hiding() {
        let mut g = two_nodes();
        g.add_edge(Edge::new("e", "a", "b")).unwrap();

        assert!(g.edge_visible(g.edge("e").unwrap()));

        assert!(g.set_node_hidden("b", true));
        let e = g.edge("e").unwrap().clone();
        assert!(!g.edge_visible(&e));

        g.set_node_hidden("b", false);
        assert!(g.edge_visible(g.edge("e").unwrap()));
    }

    #[test]
    fn hidden_edge_is_not_visible() {
        let mut g = two_nodes();
        g.add_edge(Edge::new("e", "a", "b").with_hidden(true)).unwrap();
        assert!(!g.edge_visible(g.edge("e").unwrap()));
    }
}
