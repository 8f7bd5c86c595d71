//! Graph store: the single owner of nodes, connections and selection.

use crate::node::{Connection, DEFAULT_COLOR, Node, NodeExtents, NodeId};
use indexmap::IndexMap;
use kurbo::Point;

/// Result of a graph mutation.
///
/// Mutations never fail. Operations that reference missing nodes, or that
/// would break an invariant, leave the graph untouched and report
/// `Unchanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    /// Check if the mutation modified the graph.
    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }

    fn from_bool(changed: bool) -> Self {
        if changed { Outcome::Changed } else { Outcome::Unchanged }
    }
}

/// Single active selection plus the connect-mode flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NodeId>,
    connecting: bool,
}

impl Selection {
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }
}

/// Owns the set of nodes and connections.
///
/// Nodes iterate in creation order; the first one is the layout root.
/// `child_ids` of every node always mirror the connections leaving it.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    /// Next id to hand out; strictly above every id ever assigned.
    next_id: NodeId,
    selection: Selection,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Create an empty graph whose first node will get id 1.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: Vec::new(),
            next_id: 1,
            selection: Selection::default(),
        }
    }

    /// Create a node and return it. Advances the id allocator.
    ///
    /// Returns `None` once the id space is used up; `NodeId::MAX` is never
    /// handed out.
    pub fn create_node(
        &mut self,
        text: impl Into<String>,
        position: Point,
        color: Option<&str>,
    ) -> Option<&Node> {
        let id = self.next_id;
        let Some(next) = id.checked_add(1) else {
            log::warn!("No node ids left, node not created");
            return None;
        };
        self.next_id = next;
        let color = color.unwrap_or(DEFAULT_COLOR).to_string();
        log::debug!("Created node {}", id);
        Some(
            self.nodes
                .entry(id)
                .or_insert(Node::new(id, text.into(), position, color)),
        )
    }

    /// Delete a node together with every connection touching it.
    pub fn delete_node(&mut self, id: NodeId) -> Outcome {
        if self.nodes.shift_remove(&id).is_none() {
            return Outcome::Unchanged;
        }
        self.connections.retain(|c| !c.involves(id));
        for node in self.nodes.values_mut() {
            node.child_ids.retain(|&child| child != id);
        }
        if self.selection.selected == Some(id) {
            self.selection.selected = None;
        }
        log::debug!("Deleted node {}", id);
        Outcome::Changed
    }

    /// Replace a node's label. Blank text is ignored.
    pub fn edit_text(&mut self, id: NodeId, new_text: &str) -> Outcome {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Outcome::Unchanged;
        }
        match self.nodes.get_mut(&id) {
            Some(node) if node.text != trimmed => {
                node.text = trimmed.to_string();
                Outcome::Changed
            }
            _ => Outcome::Unchanged,
        }
    }

    /// Replace a node's colour.
    pub fn set_color(&mut self, id: NodeId, color: &str) -> Outcome {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.color = color.to_string();
                Outcome::Changed
            }
            None => Outcome::Unchanged,
        }
    }

    /// Move a node's top-left corner to `position`.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> Outcome {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                Outcome::Changed
            }
            None => Outcome::Unchanged,
        }
    }

    /// Connect `source` to `target`, making `target` a layout child of `source`.
    ///
    /// Idempotent: an existing pair, a missing endpoint or a self-loop leaves
    /// the graph unchanged.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Outcome {
        if source == target
            || !self.nodes.contains_key(&target)
            || self.has_connection(source, target)
        {
            return Outcome::Unchanged;
        }
        let Some(source_node) = self.nodes.get_mut(&source) else {
            return Outcome::Unchanged;
        };
        if !source_node.child_ids.contains(&target) {
            source_node.child_ids.push(target);
        }
        self.connections.push(Connection::new(source, target));
        log::debug!("Connected {} -> {}", source, target);
        Outcome::Changed
    }

    /// Remove every node and connection and clear the selection.
    ///
    /// The id allocator is left alone so ids are never reused.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.selection = Selection::default();
    }

    /// Swap in a fully validated graph. The allocator never moves backwards.
    pub(crate) fn replace(
        &mut self,
        nodes: IndexMap<NodeId, Node>,
        connections: Vec<Connection>,
        watermark: NodeId,
    ) {
        self.reset();
        self.nodes = nodes;
        self.connections = connections;
        self.next_id = self.next_id.max(watermark);
    }

    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All connections, in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections with `id` as either endpoint.
    pub fn connections_of(&self, id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves(id))
    }

    pub fn has_connection(&self, source: NodeId, target: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.target == target)
    }

    /// The layout root: the first node in creation order.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first().map(|(_, node)| node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The id the next created node will receive.
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    /// Topmost node whose box contains `point` (canvas space).
    ///
    /// Later nodes are drawn over earlier ones, so they win.
    pub fn node_at(&self, point: Point, extents: &dyn NodeExtents) -> Option<NodeId> {
        self.nodes
            .values()
            .rev()
            .find(|node| node.bounds(extents.extent(node)).contains(point))
            .map(Node::id)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.selected
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.selected.and_then(|id| self.nodes.get(&id))
    }

    pub fn is_connecting(&self) -> bool {
        self.selection.connecting
    }

    /// Select a single node, replacing any previous selection.
    pub fn select(&mut self, id: NodeId) -> Outcome {
        if !self.nodes.contains_key(&id) {
            return Outcome::Unchanged;
        }
        let changed = self.selection.selected != Some(id);
        self.selection.selected = Some(id);
        Outcome::from_bool(changed)
    }

    pub fn clear_selection(&mut self) -> Outcome {
        Outcome::from_bool(self.selection.selected.take().is_some())
    }

    pub fn set_connecting(&mut self, connecting: bool) -> Outcome {
        let changed = self.selection.connecting != connecting;
        self.selection.connecting = connecting;
        Outcome::from_bool(changed)
    }

    /// Flip connect mode. Returns the new state.
    pub fn toggle_connecting(&mut self) -> bool {
        self.selection.connecting = !self.selection.connecting;
        self.selection.connecting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FixedExtent;

    fn store_with(n: usize) -> GraphStore {
        let mut store = GraphStore::new();
        for i in 0..n {
            store.create_node(format!("Node {}", i), Point::new(i as f64 * 200.0, 0.0), None);
        }
        store
    }

    #[test]
    fn test_create_node_allocates_ids() {
        let mut store = GraphStore::new();
        let a = store.create_node("A", Point::ZERO, None).unwrap().id();
        let b = store.create_node("B", Point::ZERO, Some("#f72585")).unwrap().id();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.next_id(), 3);
        assert_eq!(store.find_node(a).unwrap().color(), DEFAULT_COLOR);
        assert_eq!(store.find_node(b).unwrap().color(), "#f72585");
        assert!(store.find_node(a).unwrap().child_ids().is_empty());
    }

    #[test]
    fn test_connect_scenario() {
        let mut store = GraphStore::new();
        store.create_node("Central Idea", Point::new(500.0, 300.0), None);
        store.create_node("Child", Point::new(700.0, 300.0), None);

        assert_eq!(store.connect(1, 2), Outcome::Changed);
        assert_eq!(store.connections(), &[Connection::new(1, 2)]);
        assert_eq!(store.find_node(1).unwrap().child_ids(), &[2]);
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut store = store_with(2);
        assert!(store.connect(1, 2).is_changed());
        assert_eq!(store.connect(1, 2), Outcome::Unchanged);
        assert_eq!(store.connection_count(), 1);
        assert_eq!(store.find_node(1).unwrap().child_ids(), &[2]);
    }

    #[test]
    fn test_connect_rejects_missing_and_self() {
        let mut store = store_with(2);
        assert_eq!(store.connect(1, 9), Outcome::Unchanged);
        assert_eq!(store.connect(9, 1), Outcome::Unchanged);
        assert_eq!(store.connect(1, 1), Outcome::Unchanged);
        assert_eq!(store.connection_count(), 0);
    }

    #[test]
    fn test_reverse_connection_is_distinct() {
        let mut store = store_with(2);
        assert!(store.connect(1, 2).is_changed());
        assert!(store.connect(2, 1).is_changed());
        assert_eq!(store.connection_count(), 2);
    }

    #[test]
    fn test_delete_node_cleans_references() {
        let mut store = store_with(3);
        store.connect(1, 2);
        store.connect(1, 3);
        store.connect(3, 2);
        store.select(2);

        assert_eq!(store.delete_node(2), Outcome::Changed);
        assert!(store.find_node(2).is_none());
        assert_eq!(store.connections(), &[Connection::new(1, 3)]);
        assert_eq!(store.find_node(1).unwrap().child_ids(), &[3]);
        assert!(store.find_node(3).unwrap().child_ids().is_empty());
        assert_eq!(store.selected(), None);

        assert_eq!(store.delete_node(2), Outcome::Unchanged);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_delete_keeps_other_selection() {
        let mut store = store_with(2);
        store.select(1);
        store.delete_node(2);
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = store_with(2);
        store.delete_node(2);
        let id = store.create_node("Again", Point::ZERO, None).unwrap().id();
        assert_eq!(id, 3);
    }

    #[test]
    fn test_edit_text_ignores_blank() {
        let mut store = store_with(1);
        assert_eq!(store.edit_text(1, "   "), Outcome::Unchanged);
        assert_eq!(store.find_node(1).unwrap().text(), "Node 0");

        assert_eq!(store.edit_text(1, "  Renamed \n"), Outcome::Changed);
        assert_eq!(store.find_node(1).unwrap().text(), "Renamed");

        assert_eq!(store.edit_text(7, "Nobody"), Outcome::Unchanged);
    }

    #[test]
    fn test_set_color() {
        let mut store = store_with(1);
        assert!(store.set_color(1, "#ff9e00").is_changed());
        assert_eq!(store.find_node(1).unwrap().color(), "#ff9e00");
        assert_eq!(store.set_color(5, "#ff9e00"), Outcome::Unchanged);
    }

    #[test]
    fn test_reset_keeps_allocator() {
        let mut store = store_with(3);
        store.select(1);
        store.set_connecting(true);
        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.connection_count(), 0);
        assert_eq!(store.selection(), Selection::default());
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn test_root_follows_creation_order() {
        let mut store = store_with(3);
        assert_eq!(store.root().map(Node::id), Some(1));
        store.delete_node(1);
        assert_eq!(store.root().map(Node::id), Some(2));
        let order: Vec<NodeId> = store.nodes().map(Node::id).collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut store = GraphStore::new();
        store.create_node("Back", Point::new(0.0, 0.0), None);
        store.create_node("Front", Point::new(50.0, 10.0), None);
        let extents = FixedExtent::default();

        assert_eq!(store.node_at(Point::new(60.0, 20.0), &extents), Some(2));
        assert_eq!(store.node_at(Point::new(10.0, 10.0), &extents), Some(1));
        assert_eq!(store.node_at(Point::new(500.0, 500.0), &extents), None);
    }

    #[test]
    fn test_select_missing_node() {
        let mut store = store_with(1);
        assert_eq!(store.select(4), Outcome::Unchanged);
        assert_eq!(store.selected(), None);
        assert!(store.select(1).is_changed());
        assert_eq!(store.select(1), Outcome::Unchanged);
    }

    #[test]
    fn test_toggle_connecting() {
        let mut store = GraphStore::new();
        assert!(store.toggle_connecting());
        assert!(store.is_connecting());
        assert!(!store.toggle_connecting());
    }

    #[test]
    fn test_connections_of() {
        let mut store = store_with(3);
        store.connect(1, 2);
        store.connect(2, 3);
        assert_eq!(store.connections_of(2).count(), 2);
        assert_eq!(store.connections_of(1).count(), 1);
    }
}
