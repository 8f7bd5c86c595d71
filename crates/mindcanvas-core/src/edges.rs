//! Connection overlay geometry.
//!
//! The overlay is derived state: it must be refreshed after anything that
//! moves nodes or changes connections, before the frame is drawn.

use crate::graph::GraphStore;
use crate::node::{NodeExtents, NodeId};
use kurbo::Line;

/// One connection line, between the centres of its endpoint nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub source: NodeId,
    pub target: NodeId,
    pub line: Line,
    /// Touches the selected node.
    pub highlighted: bool,
}

/// Renderable connection lines, in connection order.
#[derive(Debug, Clone, Default)]
pub struct EdgeOverlay {
    segments: Vec<EdgeSegment>,
}

impl EdgeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every segment from the current node positions.
    pub fn refresh(&mut self, graph: &GraphStore, extents: &dyn NodeExtents) {
        let selected = graph.selected();
        self.segments.clear();
        for conn in graph.connections() {
            let (Some(source), Some(target)) =
                (graph.find_node(conn.source), graph.find_node(conn.target))
            else {
                continue;
            };
            self.segments.push(EdgeSegment {
                source: conn.source,
                target: conn.target,
                line: Line::new(
                    source.center(extents.extent(source)),
                    target.center(extents.extent(target)),
                ),
                highlighted: selected.is_some_and(|id| conn.involves(id)),
            });
        }
    }

    pub fn segments(&self) -> &[EdgeSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
