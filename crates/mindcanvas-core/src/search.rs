//! Text search highlighting.

use crate::graph::GraphStore;
use crate::node::NodeId;
use std::collections::HashMap;

/// Search flag for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Matched,
    Unmatched,
}

/// Flags derived from the current query and node texts.
///
/// Recompute with [`SearchState::refresh`] whenever node texts change.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Lower-cased, trimmed query. Empty means no search is active.
    query: String,
    flags: HashMap<NodeId, Highlight>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new query and recompute every flag.
    pub fn set_query(&mut self, query: &str, graph: &GraphStore) {
        self.query = query.trim().to_lowercase();
        self.refresh(graph);
    }

    /// Recompute flags for the current query.
    pub fn refresh(&mut self, graph: &GraphStore) {
        self.flags.clear();
        if self.query.is_empty() {
            return;
        }
        for node in graph.nodes() {
            let flag = if node.text().to_lowercase().contains(&self.query) {
                Highlight::Matched
            } else {
                Highlight::Unmatched
            };
            self.flags.insert(node.id(), flag);
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Flag for a node, or `None` when no search is active.
    pub fn highlight(&self, id: NodeId) -> Option<Highlight> {
        self.flags.get(&id).copied()
    }

    /// Ids of every matched node.
    pub fn matches(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.flags
            .iter()
            .filter(|(_, flag)| **flag == Highlight::Matched)
            .map(|(&id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn graph() -> GraphStore {
        let mut graph = GraphStore::new();
        graph.create_node("Central Idea", Point::ZERO, None);
        graph.create_node("Side idea", Point::ZERO, None);
        graph.create_node("Budget", Point::ZERO, None);
        graph
    }

    #[test]
    fn test_case_insensitive_match() {
        let graph = graph();
        let mut search = SearchState::new();
        search.set_query("IDEA", &graph);

        assert_eq!(search.highlight(1), Some(Highlight::Matched));
        assert_eq!(search.highlight(2), Some(Highlight::Matched));
        assert_eq!(search.highlight(3), Some(Highlight::Unmatched));
        let mut matched: Vec<NodeId> = search.matches().collect();
        matched.sort();
        assert_eq!(matched, vec![1, 2]);
    }

    #[test]
    fn test_empty_query_clears_flags() {
        let graph = graph();
        let mut search = SearchState::new();
        search.set_query("budget", &graph);
        assert!(search.is_active());

        search.set_query("   ", &graph);
        assert!(!search.is_active());
        assert_eq!(search.highlight(3), None);
    }

    #[test]
    fn test_refresh_after_edit() {
        let mut graph = graph();
        let mut search = SearchState::new();
        search.set_query("plan", &graph);
        assert_eq!(search.highlight(3), Some(Highlight::Unmatched));

        graph.edit_text(3, "Project plan");
        search.refresh(&graph);
        assert_eq!(search.highlight(3), Some(Highlight::Matched));
    }
}
