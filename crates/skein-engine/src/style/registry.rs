//! Style registration and name resolution.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use crate::style::{ArrowEdges, DiscNodes, EdgeStyle, LineEdges, NodeStyle};

/// Rejected style registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The style's descriptor cannot produce drawable buffers.
    InvalidDescriptor { style: String, reason: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidDescriptor { style, reason } => {
                write!(f, "style '{style}' rejected: {reason}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Named node and edge styles, with a guaranteed fallback per category.
///
/// Invariant: the fallback names always refer to registered styles. The
/// constructor registers them and nothing can remove an entry, so
/// resolution never dead-ends; an element asking for an unknown style
/// silently lands in the fallback group rather than failing the build.
pub struct StyleRegistry {
    nodes: HashMap<String, Box<dyn NodeStyle>>,
    edges: HashMap<String, Box<dyn EdgeStyle>>,
    node_fallback: String,
    edge_fallback: String,
}

impl StyleRegistry {
    /// Registry whose fallbacks are the given styles. Fails when either
    /// fallback descriptor is invalid.
    pub fn new(
        node_fallback: &str,
        node_style: Box<dyn NodeStyle>,
        edge_fallback: &str,
        edge_style: Box<dyn EdgeStyle>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            node_fallback: node_fallback.to_owned(),
            edge_fallback: edge_fallback.to_owned(),
        };
        registry.register_node(node_fallback, node_style)?;
        registry.register_edge(edge_fallback, edge_style)?;
        Ok(registry)
    }

    /// The built-in set: disc nodes (fallback), line edges (fallback)
    /// and arrow edges.
    pub fn builtin() -> Self {
        let mut registry = Self::new(
            "disc",
            Box::new(DiscNodes::new()),
            "line",
            Box::new(LineEdges::new()),
        )
        .expect("built-in style descriptors are valid");
        registry
            .register_edge("arrow", Box::new(ArrowEdges::new()))
            .expect("built-in style descriptors are valid");
        registry
    }

    /// Registers (or replaces) a node style after validating its
    /// descriptor.
    pub fn register_node(
        &mut self,
        name: &str,
        style: Box<dyn NodeStyle>,
    ) -> Result<(), RegistryError> {
        validate(name, style.points(), style.attributes())?;
        self.nodes.insert(name.to_owned(), style);
        Ok(())
    }

    /// Registers (or replaces) an edge style after validating its
    /// descriptor.
    pub fn register_edge(
        &mut self,
        name: &str,
        style: Box<dyn EdgeStyle>,
    ) -> Result<(), RegistryError> {
        validate(name, style.points(), style.attributes())?;
        self.edges.insert(name.to_owned(), style);
        Ok(())
    }

    pub fn node_style(&self, name: &str) -> Option<&dyn NodeStyle> {
        self.nodes.get(name).map(|s| s.as_ref())
    }

    pub fn edge_style(&self, name: &str) -> Option<&dyn EdgeStyle> {
        self.edges.get(name).map(|s| s.as_ref())
    }

    /// Resolves the style an element draws with: its own request when
    /// registered, else the configured default, else the fallback. The
    /// returned name is the canonical registry key.
    pub fn resolve_node<'r>(
        &'r self,
        requested: Option<&str>,
        default: &str,
    ) -> (&'r str, &'r dyn NodeStyle) {
        for name in [requested, Some(default)].into_iter().flatten() {
            if let Some((key, style)) = self.nodes.get_key_value(name) {
                return (key.as_str(), style.as_ref());
            }
        }
        let (key, style) = self
            .nodes
            .get_key_value(&self.node_fallback)
            .expect("fallback style is registered at construction");
        (key.as_str(), style.as_ref())
    }

    /// Edge counterpart of [`StyleRegistry::resolve_node`].
    pub fn resolve_edge<'r>(
        &'r self,
        requested: Option<&str>,
        default: &str,
    ) -> (&'r str, &'r dyn EdgeStyle) {
        for name in [requested, Some(default)].into_iter().flatten() {
            if let Some((key, style)) = self.edges.get_key_value(name) {
                return (key.as_str(), style.as_ref());
            }
        }
        let (key, style) = self
            .edges
            .get_key_value(&self.edge_fallback)
            .expect("fallback style is registered at construction");
        (key.as_str(), style.as_ref())
    }
}

fn validate(name: &str, points: usize, attributes: usize) -> Result<(), RegistryError> {
    if points == 0 || attributes == 0 {
        return Err(RegistryError::InvalidDescriptor {
            style: name.to_owned(),
            reason: format!("needs points > 0 and attributes > 0, got {points}x{attributes}"),
        });
    }
    Ok(())
}
