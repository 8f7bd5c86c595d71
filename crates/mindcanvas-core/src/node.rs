//! Node and connection definitions for the diagram graph.

use kurbo::{Point, Rect, Size};

/// Unique identifier for a node. Assigned by the graph's allocator.
pub type NodeId = u64;

/// Colour given to nodes created without an explicit one.
pub const DEFAULT_COLOR: &str = "#333";

/// Colour choices offered by the colour picker.
pub const PALETTE: [&str; 15] = [
    "#333", "#4361ee", "#3a0ca3", "#7209b7", "#f72585",
    "#4cc9f0", "#4895ef", "#560bad", "#b5179e", "#f72585",
    "#ff9e00", "#ff6b00", "#ff0054", "#a8dadc", "#457b9d",
];

/// A labeled, positioned vertex in the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Top-left corner in canvas space.
    pub(crate) position: Point,
    pub(crate) text: String,
    /// Style token, only interpreted by the renderer.
    pub(crate) color: String,
    /// Layout children, in the order their connections were created.
    pub(crate) child_ids: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, text: String, position: Point, color: String) -> Self {
        Self {
            id,
            position,
            text,
            color,
            child_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }

    /// Box covered by this node when drawn with the given extent.
    pub fn bounds(&self, extent: Size) -> Rect {
        Rect::from_origin_size(self.position, extent)
    }

    /// Centre of the node's box, where connection lines attach.
    pub fn center(&self, extent: Size) -> Point {
        self.bounds(extent).center()
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Check if this connection touches a specific node.
    pub fn involves(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

/// Source of rendered node sizes.
///
/// The renderer owns the visual representation of each node, so it is the
/// one that knows how large a node is on screen. Hit testing and connection
/// endpoints are computed from these extents.
pub trait NodeExtents {
    /// Size of the node's box in canvas units.
    fn extent(&self, node: &Node) -> Size;
}

/// Every node has the same size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedExtent(pub Size);

impl FixedExtent {
    pub const DEFAULT: FixedExtent = FixedExtent(Size::new(120.0, 40.0));
}

impl Default for FixedExtent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl NodeExtents for FixedExtent {
    fn extent(&self, _node: &Node) -> Size {
        self.0
    }
}
