//! Horizontal and vertical layouts.
//!
//! Nodes flow away from the root in lanes (columns for horizontal, rows
//! for vertical). Inside a lane they zig-zag across the flow direction
//! until the offset from the root exceeds `bound`, then the next lane
//! starts back at the root's line with the zig-zag direction flipped.

use super::Placement;
use crate::graph::GraphStore;
use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Position of the root.
    pub root: Point,
    /// Distance between lanes, along the flow direction.
    pub lane_spacing: f64,
    /// Distance between nodes inside a lane.
    pub step: f64,
    /// Largest offset from the root's line before a new lane starts.
    pub bound: f64,
}

impl FlowConfig {
    /// Columns 200 apart, nodes 100 apart vertically.
    pub fn horizontal() -> Self {
        Self {
            root: Point::new(500.0, 300.0),
            lane_spacing: 200.0,
            step: 100.0,
            bound: 200.0,
        }
    }

    /// Rows 100 apart, nodes 150 apart horizontally.
    pub fn vertical() -> Self {
        Self {
            root: Point::new(500.0, 100.0),
            lane_spacing: 100.0,
            step: 150.0,
            bound: 300.0,
        }
    }
}

/// Flow settings as written in a config file. Absent fields keep the
/// defaults of the direction being configured.
#[derive(Debug, Default, Deserialize)]
struct FlowOverrides {
    root: Option<Point>,
    lane_spacing: Option<f64>,
    step: Option<f64>,
    bound: Option<f64>,
}

impl FlowOverrides {
    fn over(self, base: FlowConfig) -> FlowConfig {
        FlowConfig {
            root: self.root.unwrap_or(base.root),
            lane_spacing: self.lane_spacing.unwrap_or(base.lane_spacing),
            step: self.step.unwrap_or(base.step),
            bound: self.bound.unwrap_or(base.bound),
        }
    }
}

pub(super) fn deserialize_horizontal<'de, D>(deserializer: D) -> Result<FlowConfig, D::Error>
where
    D: Deserializer<'de>,
{
    FlowOverrides::deserialize(deserializer).map(|o| o.over(FlowConfig::horizontal()))
}

pub(super) fn deserialize_vertical<'de, D>(deserializer: D) -> Result<FlowConfig, D::Error>
where
    D: Deserializer<'de>,
{
    FlowOverrides::deserialize(deserializer).map(|o| o.over(FlowConfig::vertical()))
}

/// Flow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Axis {
    /// Lanes advance along x (horizontal layout).
    X,
    /// Lanes advance along y (vertical layout).
    Y,
}

impl Axis {
    /// Split a point into (along flow, across flow).
    fn split(self, p: Point) -> (f64, f64) {
        match self {
            Axis::X => (p.x, p.y),
            Axis::Y => (p.y, p.x),
        }
    }

    fn join(self, along: f64, across: f64) -> Point {
        match self {
            Axis::X => Point::new(along, across),
            Axis::Y => Point::new(across, along),
        }
    }
}

pub(super) fn place(graph: &GraphStore, config: &FlowConfig, axis: Axis) -> Placement {
    let mut nodes = graph.nodes();
    let Some(root) = nodes.next() else {
        return Placement::new();
    };
    let mut placement = vec![(root.id(), config.root)];

    let (root_along, root_across) = axis.split(config.root);
    let mut along = root_along + config.lane_spacing;
    let mut across = root_across;
    let mut direction = 1.0;

    for node in nodes {
        placement.push((node.id(), axis.join(along, across)));
        across += config.step * direction;
        if (across - root_across).abs() > config.bound {
            direction = -direction;
            along += config.lane_spacing;
            across = root_across;
        }
    }
    placement
}
