//! Deterministic layout modes.
//!
//! Every mode anchors the first node in creation order (the root) at a fixed
//! point and assigns a position to the nodes it reaches. Positions are
//! computed into a [`Placement`] first and only then written to the graph,
//! so a failed layout never leaves the graph half-moved.

mod flow;
mod radial;
mod tree;

pub use flow::FlowConfig;
pub use radial::RadialConfig;
pub use tree::TreeConfig;

use crate::graph::GraphStore;
use crate::node::NodeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Layout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Tree layout found a cycle through node {node}")]
    Cycle { node: NodeId },
    #[error("Unknown layout mode: {0}")]
    UnknownMode(String),
}

/// Available layout modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Radial,
    Horizontal,
    Vertical,
    Tree,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 4] = [
        LayoutMode::Radial,
        LayoutMode::Horizontal,
        LayoutMode::Vertical,
        LayoutMode::Tree,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutMode::Radial => "radial",
            LayoutMode::Horizontal => "horizontal",
            LayoutMode::Vertical => "vertical",
            LayoutMode::Tree => "tree",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        LayoutMode::ALL
            .into_iter()
            .find(|mode| mode.name() == lowered)
            .ok_or_else(|| LayoutError::UnknownMode(s.to_string()))
    }
}

/// Constants for every layout mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub radial: RadialConfig,
    #[serde(
        default = "FlowConfig::horizontal",
        deserialize_with = "flow::deserialize_horizontal"
    )]
    pub horizontal: FlowConfig,
    #[serde(
        default = "FlowConfig::vertical",
        deserialize_with = "flow::deserialize_vertical"
    )]
    pub vertical: FlowConfig,
    pub tree: TreeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radial: RadialConfig::default(),
            horizontal: FlowConfig::horizontal(),
            vertical: FlowConfig::vertical(),
            tree: TreeConfig::default(),
        }
    }
}

/// Positions assigned by a layout, in assignment order.
pub type Placement = Vec<(NodeId, Point)>;

/// Computes and applies layouts.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for `mode` without touching the graph.
    pub fn compute(&self, mode: LayoutMode, graph: &GraphStore) -> Result<Placement, LayoutError> {
        if graph.is_empty() {
            return Ok(Placement::new());
        }
        match mode {
            LayoutMode::Radial => Ok(radial::place(graph, &self.config.radial)),
            LayoutMode::Horizontal => Ok(flow::place(graph, &self.config.horizontal, flow::Axis::X)),
            LayoutMode::Vertical => Ok(flow::place(graph, &self.config.vertical, flow::Axis::Y)),
            LayoutMode::Tree => tree::place(graph, &self.config.tree),
        }
    }

    /// Compute positions for `mode` and write them into the graph.
    ///
    /// Returns the number of nodes that were positioned. On error the graph
    /// is left untouched.
    pub fn apply(&self, mode: LayoutMode, graph: &mut GraphStore) -> Result<usize, LayoutError> {
        let placement = self.compute(mode, graph)?;
        for &(id, position) in &placement {
            graph.move_node(id, position);
        }
        log::debug!("Applied {} layout to {} nodes", mode, placement.len());
        Ok(placement.len())
    }
}
