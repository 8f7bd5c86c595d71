//! Tree layout: children centred in a row below their parent.

use super::{LayoutError, Placement};
use crate::graph::GraphStore;
use crate::node::NodeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Position of the root.
    pub root: Point,
    /// Distance between siblings.
    pub horizontal_spacing: f64,
    /// Distance between a parent and its children.
    pub vertical_spacing: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root: Point::new(500.0, 100.0),
            horizontal_spacing: 200.0,
            vertical_spacing: 100.0,
        }
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// Children of `id` that exist in the graph, in order.
fn children_of(graph: &GraphStore, id: NodeId) -> Vec<NodeId> {
    graph
        .find_node(id)
        .map(|node| node.child_ids().to_vec())
        .unwrap_or_default()
        .into_iter()
        .filter(|&child| graph.contains(child))
        .collect()
}

/// Depth-first placement from the root along `child_ids`.
///
/// Every reachable node is placed exactly once. A node with several parents
/// sits under the parent discovered last, in the slot that parent gives it.
/// Nodes not reachable from the root are not part of the placement.
pub(super) fn place(graph: &GraphStore, config: &TreeConfig) -> Result<Placement, LayoutError> {
    let Some(root) = graph.root().map(|node| node.id()) else {
        return Ok(Placement::new());
    };

    // Discovery order, finish order and each node's children, one pass.
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();
    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut discovered = Vec::new();
    let mut finished = Vec::new();
    let mut stack = vec![Visit::Enter(root)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Exit(id) => {
                marks.insert(id, Mark::Done);
                finished.push(id);
            }
            Visit::Enter(id) => {
                match marks.get(&id) {
                    Some(Mark::Done) => continue,
                    Some(Mark::OnPath) => {
                        log::warn!("Tree layout aborted: node {} is its own ancestor", id);
                        return Err(LayoutError::Cycle { node: id });
                    }
                    None => {}
                }
                marks.insert(id, Mark::OnPath);
                discovered.push(id);
                stack.push(Visit::Exit(id));

                let kids = children_of(graph, id);
                // Reverse so the first child is visited first.
                stack.extend(kids.iter().rev().map(|&child| Visit::Enter(child)));
                children.insert(id, kids);
            }
        }
    }

    // Later parents overwrite earlier ones.
    let mut owner: HashMap<NodeId, (NodeId, usize)> = HashMap::new();
    for &parent in &discovered {
        for (slot, &child) in children.get(&parent).into_iter().flatten().enumerate() {
            owner.insert(child, (parent, slot));
        }
    }

    // Reverse finish order puts every parent before its children.
    let mut positions: HashMap<NodeId, Point> = HashMap::with_capacity(finished.len());
    positions.insert(root, config.root);
    for &id in finished.iter().rev() {
        let Some(&(parent, slot)) = owner.get(&id) else {
            continue;
        };
        let Some(&origin) = positions.get(&parent) else {
            continue;
        };
        let siblings = children.get(&parent).map_or(0, Vec::len);
        let span = siblings.saturating_sub(1) as f64 * config.horizontal_spacing;
        let x = origin.x - span / 2.0 + slot as f64 * config.horizontal_spacing;
        positions.insert(id, Point::new(x, origin.y + config.vertical_spacing));
    }

    Ok(discovered
        .into_iter()
        .filter_map(|id| positions.get(&id).map(|&position| (id, position)))
        .collect())
}
