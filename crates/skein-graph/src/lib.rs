//! Graph model consumed by the **skein** rendering engine.
//!
//! This crate is intentionally dependency-free so it can be consumed by
//! layout tools, importers, and tests without pulling in any engine or GPU
//! code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`color`] | `Rgba` (straight-alpha byte color, hex parsing) |
//! | [`element`] | `Node`, `Edge`, `NodeShape`, `HeadKind`, `ViewCoords` |
//! | [`store`] | `GraphStore`, `GraphError` |
//!
//! # Quick start
//!
//! ```rust
//! use skein_graph::{Edge, GraphStore, Node};
//!
//! let mut graph = GraphStore::new();
//! graph.add_node(Node::new("a", 0.0, 0.0)).unwrap();
//! graph.add_node(Node::new("b", 10.0, 5.0)).unwrap();
//! graph.add_edge(Edge::new("a->b", "a", "b")).unwrap();
//!
//! let (source, target) = graph.endpoints(graph.edges().first().unwrap()).unwrap();
//! assert_eq!(source.id, "a");
//! assert_eq!(target.id, "b");
//! ```

pub mod color;
pub mod element;
pub mod store;

pub use color::Rgba;
pub use element::{Edge, HeadKind, Node, NodeShape, ViewCoords};
pub use store::{GraphError, GraphStore};
