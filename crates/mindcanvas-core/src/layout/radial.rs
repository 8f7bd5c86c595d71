//! Radial layout: root at the centre, everything else on one circle.

use super::Placement;
use crate::graph::GraphStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Position of the root, and centre of the circle.
    pub center: Point,
    pub radius: f64,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            center: Point::new(500.0, 300.0),
            radius: 200.0,
        }
    }
}

pub(super) fn place(graph: &GraphStore, config: &RadialConfig) -> Placement {
    let mut nodes = graph.nodes();
    let Some(root) = nodes.next() else {
        return Placement::new();
    };
    let mut placement = vec![(root.id(), config.center)];

    let others = graph.node_count() - 1;
    if others == 0 {
        return placement;
    }
    let step = TAU / others as f64;
    for (k, node) in nodes.enumerate() {
        let angle = k as f64 * step;
        let position = Point::new(
            config.center.x + config.radius * angle.cos(),
            config.center.y + config.radius * angle.sin(),
        );
        placement.push((node.id(), position));
    }
    placement
}
