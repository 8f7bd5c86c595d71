//! Portable document format and whole-graph import/export.
//!
//! The same JSON shape is used for local files and for stored maps:
//!
//! ```json
//! {
//!   "nodes": [{ "id": 1, "x": 500.0, "y": 300.0, "text": "Central Idea",
//!               "color": "#333", "childIds": [2] }],
//!   "connections": [{ "source": 1, "target": 2 }],
//!   "nextId": 3
//! }
//! ```

use crate::graph::GraphStore;
use crate::node::{Connection, DEFAULT_COLOR, Node, NodeId};
use indexmap::IndexMap;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Document errors. Any of these leaves the graph untouched.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate node id {0}")]
    DuplicateNode(NodeId),
    #[error("Node {0} has a non-finite position")]
    NonFinitePosition(NodeId),
    #[error("Connection {from} -> {to} references a missing node")]
    DanglingConnection { from: NodeId, to: NodeId },
    #[error("Duplicate connection {from} -> {to}")]
    DuplicateConnection { from: NodeId, to: NodeId },
    #[error("Connection from node {0} to itself")]
    SelfLoop(NodeId),
    #[error("Node {parent} lists missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("Children of node {0} do not match its connections")]
    ChildrenMismatch(NodeId),
    #[error("Node id {0} leaves no room for new ids")]
    IdOverflow(NodeId),
}

/// A serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Older documents call this field `children`.
    #[serde(default, alias = "children")]
    pub child_ids: Vec<NodeId>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A serialized connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub source: NodeId,
    pub target: NodeId,
}

/// A complete graph snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
    /// Allocator watermark when the snapshot was taken.
    pub next_id: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// A document with no nodes, as used for a freshly created map.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            next_id: 1,
        }
    }

    /// Snapshot the whole graph.
    pub fn export(graph: &GraphStore) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|node| NodeRecord {
                    id: node.id(),
                    x: node.position().x,
                    y: node.position().y,
                    text: node.text().to_string(),
                    color: node.color().to_string(),
                    child_ids: node.child_ids().to_vec(),
                })
                .collect(),
            connections: graph
                .connections()
                .iter()
                .map(|c| ConnectionRecord { source: c.source, target: c.target })
                .collect(),
            next_id: graph.next_id(),
        }
    }

    /// Replace the graph's contents with this document.
    ///
    /// The document is validated in full before anything is touched, so on
    /// error the graph is exactly as it was. Imported nodes keep their ids;
    /// the allocator is raised above every imported id.
    pub fn import_into(&self, graph: &mut GraphStore) -> Result<(), DocumentError> {
        let staged = self.stage().inspect_err(|e| log::warn!("Rejected document: {e}"))?;
        graph.replace(staged.nodes, staged.connections, staged.watermark);
        log::info!(
            "Imported {} nodes and {} connections",
            graph.node_count(),
            graph.connection_count()
        );
        Ok(())
    }

    /// Check the document without importing it.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.stage().map(|_| ())
    }

    fn stage(&self) -> Result<Staged, DocumentError> {
        let mut nodes: IndexMap<NodeId, Node> = IndexMap::with_capacity(self.nodes.len());
        for record in &self.nodes {
            if !(record.x.is_finite() && record.y.is_finite()) {
                return Err(DocumentError::NonFinitePosition(record.id));
            }
            let mut node = Node::new(
                record.id,
                record.text.clone(),
                Point::new(record.x, record.y),
                record.color.clone(),
            );
            node.child_ids = record.child_ids.clone();
            if nodes.insert(record.id, node).is_some() {
                return Err(DocumentError::DuplicateNode(record.id));
            }
        }

        let mut seen = HashSet::with_capacity(self.connections.len());
        let mut connections = Vec::with_capacity(self.connections.len());
        for &ConnectionRecord { source, target } in &self.connections {
            if !nodes.contains_key(&source) || !nodes.contains_key(&target) {
                return Err(DocumentError::DanglingConnection { from: source, to: target });
            }
            if source == target {
                return Err(DocumentError::SelfLoop(source));
            }
            if !seen.insert((source, target)) {
                return Err(DocumentError::DuplicateConnection { from: source, to: target });
            }
            connections.push(Connection::new(source, target));
        }

        for node in nodes.values() {
            if let Some(&child) = node.child_ids.iter().find(|&&c| !nodes.contains_key(&c)) {
                return Err(DocumentError::DanglingChild { parent: node.id, child });
            }
            let expected = connections
                .iter()
                .filter(|c| c.source == node.id)
                .map(|c| c.target);
            if !node.child_ids.iter().copied().eq(expected) {
                return Err(DocumentError::ChildrenMismatch(node.id));
            }
        }

        // The allocator hands out `watermark` next, so it must stay below MAX.
        let highest = nodes.keys().copied().max().unwrap_or(0);
        let watermark = highest
            .checked_add(1)
            .map(|above| self.next_id.max(above))
            .filter(|&next| next < NodeId::MAX)
            .ok_or(DocumentError::IdOverflow(highest.max(self.next_id)))?;
        Ok(Staged {
            nodes,
            connections,
            watermark,
        })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON. Missing or mistyped fields are rejected.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A validated graph waiting to be swapped in.
struct Staged {
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    watermark: NodeId,
}
