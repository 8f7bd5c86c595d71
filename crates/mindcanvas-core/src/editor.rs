//! Editor facade tying the graph, layouts, viewport and interaction together.
//!
//! Hosts feed raw input and toolbar actions into an [`Editor`] and draw from
//! its read accessors. Derived state (edge overlay, search flags) is kept
//! current after every call.

use crate::config::EditorConfig;
use crate::document::{Document, DocumentError};
use crate::edges::EdgeOverlay;
use crate::graph::GraphStore;
use crate::input::{Key, PointerEvent, TouchEvent};
use crate::interaction::{EditRequest, InteractionController, InteractionState, Response};
use crate::layout::{LayoutEngine, LayoutError, LayoutMode};
use crate::node::{Node, NodeExtents, NodeId};
use crate::search::SearchState;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};

/// Text of the node every new editor starts with.
pub const ROOT_TEXT: &str = "Central Idea";
/// Where the starting node and parentless new nodes are placed.
pub const ROOT_POSITION: Point = Point::new(500.0, 300.0);
/// Text of a node added with nothing selected.
pub const DETACHED_TEXT: &str = "New Idea";
/// Text of a node added as a child of the selection.
pub const CHILD_TEXT: &str = "New Node";
/// Offset of a new child from its parent.
pub const CHILD_OFFSET: Vec2 = Vec2::new(200.0, 0.0);

/// Toolbar and context menu actions.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Add a child of the selection, or a detached node if nothing is selected.
    AddNode,
    ToggleConnect,
    /// Ask for the selected node's text to be edited.
    EditSelected,
    DeleteSelected,
    SetColor(String),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetLayout(LayoutMode),
    Search(String),
}

/// Outcome of a text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditResult {
    Replaced(String),
    Canceled,
}

/// Something that can answer an [`EditRequest`], such as a text box.
pub trait EditPanel {
    fn edit(&mut self, request: &EditRequest) -> EditResult;
}

/// An interactive diagram editor.
pub struct Editor {
    graph: GraphStore,
    viewport: Viewport,
    layout: LayoutEngine,
    mode: LayoutMode,
    search: SearchState,
    controller: InteractionController,
    overlay: EdgeOverlay,
    extents: Box<dyn NodeExtents>,
    default_color: String,
    /// Whether there are changes since the last save or load.
    dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create an editor holding the single starting node, laid out with the
    /// default mode.
    pub fn with_config(config: &EditorConfig) -> Self {
        let mut editor = Self {
            graph: GraphStore::new(),
            viewport: Viewport::new(),
            layout: LayoutEngine::new(config.layout.clone()),
            mode: LayoutMode::default(),
            search: SearchState::new(),
            controller: InteractionController::new(config.double_click),
            overlay: EdgeOverlay::new(),
            extents: Box::new(config.extents()),
            default_color: config.default_color.clone(),
            dirty: false,
        };
        editor
            .graph
            .create_node(ROOT_TEXT, ROOT_POSITION, Some(config.default_color.as_str()));
        editor.relayout();
        editor.overlay.refresh(&editor.graph, editor.extents.as_ref());
        editor
    }

    /// Replace the node extent provider, usually with one backed by the renderer.
    pub fn with_extents(mut self, extents: Box<dyn NodeExtents>) -> Self {
        self.extents = extents;
        self.overlay.refresh(&self.graph, self.extents.as_ref());
        self
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn overlay(&self) -> &EdgeOverlay {
        &self.overlay
    }

    pub fn extents(&self) -> &dyn NodeExtents {
        self.extents.as_ref()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Response {
        let response = self.controller.handle_pointer(
            event,
            &mut self.graph,
            &mut self.viewport,
            self.extents.as_ref(),
        );
        self.settle(response)
    }

    pub fn handle_touch(&mut self, event: &TouchEvent) -> Response {
        let response = self.controller.handle_touch(
            event,
            &mut self.graph,
            &mut self.viewport,
            self.extents.as_ref(),
        );
        self.settle(response)
    }

    pub fn handle_key(&mut self, key: &Key) -> Response {
        let response = self.controller.handle_key(key, &mut self.graph);
        self.settle(response)
    }

    /// Run a toolbar or context menu action.
    ///
    /// Only [`EditorAction::SetLayout`] can fail.
    pub fn perform(&mut self, action: EditorAction) -> Result<Response, LayoutError> {
        let mut response = Response::default();
        match action {
            EditorAction::AddNode => {
                let added = self.add_node().is_some();
                response.graph_changed = added;
                response.structure_changed = added;
            }
            EditorAction::ToggleConnect => {
                response = self.controller.toggle_connect(&mut self.graph);
            }
            EditorAction::EditSelected => {
                response.edit_request = self.graph.selected_node().map(|node| EditRequest {
                    node: node.id(),
                    text: node.text().to_string(),
                });
            }
            EditorAction::DeleteSelected => {
                response = self.controller.handle_key(&Key::Delete, &mut self.graph);
            }
            EditorAction::SetColor(color) => {
                if let Some(id) = self.graph.selected() {
                    response.graph_changed = self.graph.set_color(id, &color).is_changed();
                }
            }
            EditorAction::ZoomIn => {
                self.viewport.zoom_in();
                response.view_changed = true;
            }
            EditorAction::ZoomOut => {
                self.viewport.zoom_out();
                response.view_changed = true;
            }
            EditorAction::ResetZoom => {
                self.viewport.reset_zoom();
                response.view_changed = true;
            }
            EditorAction::SetLayout(mode) => {
                self.set_layout(mode)?;
                response.graph_changed = true;
            }
            EditorAction::Search(query) => {
                self.search.set_query(&query, &self.graph);
            }
        }
        Ok(self.settle(response))
    }

    /// Switch layout mode and apply it.
    ///
    /// The new mode is kept even if applying it fails; nothing is moved in
    /// that case.
    pub fn set_layout(&mut self, mode: LayoutMode) -> Result<(), LayoutError> {
        self.mode = mode;
        self.layout.apply(mode, &mut self.graph)?;
        self.overlay.refresh(&self.graph, self.extents.as_ref());
        self.dirty = true;
        Ok(())
    }

    /// Apply the result of a text edit.
    pub fn finish_edit(&mut self, request: &EditRequest, result: EditResult) -> Response {
        let response = match result {
            EditResult::Replaced(text) => Response {
                graph_changed: self.graph.edit_text(request.node, &text).is_changed(),
                ..Response::default()
            },
            EditResult::Canceled => Response::default(),
        };
        self.settle(response)
    }

    /// Answer an edit request with `panel` and apply the result.
    pub fn run_edit(&mut self, request: &EditRequest, panel: &mut dyn EditPanel) -> Response {
        let result = panel.edit(request);
        self.finish_edit(request, result)
    }

    pub fn export(&self) -> Document {
        Document::export(&self.graph)
    }

    /// Replace the diagram with a document, then re-apply the current layout.
    ///
    /// On error nothing changes.
    pub fn import(&mut self, document: &Document) -> Result<(), DocumentError> {
        document.import_into(&mut self.graph)?;
        self.controller.cancel();
        self.relayout();
        self.overlay.refresh(&self.graph, self.extents.as_ref());
        self.search.refresh(&self.graph);
        self.dirty = true;
        Ok(())
    }

    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = Document::from_json(json)?;
        self.import(&document)
    }

    fn add_node(&mut self) -> Option<NodeId> {
        let color = self.default_color.as_str();
        match self.graph.selected_node().map(|n| (n.id(), n.position())) {
            Some((parent, position)) => {
                let child = self
                    .graph
                    .create_node(CHILD_TEXT, position + CHILD_OFFSET, Some(color))?
                    .id();
                self.graph.connect(parent, child);
                Some(child)
            }
            None => self
                .graph
                .create_node(DETACHED_TEXT, ROOT_POSITION, Some(color))
                .map(Node::id),
        }
    }

    /// Re-apply the current mode after a structural change.
    fn relayout(&mut self) {
        if let Err(e) = self.layout.apply(self.mode, &mut self.graph) {
            log::warn!("Skipped {} layout: {}", self.mode, e);
        }
    }

    /// Bring derived state up to date with what `response` changed.
    fn settle(&mut self, response: Response) -> Response {
        if response.structure_changed {
            self.relayout();
        }
        if response.graph_changed || response.structure_changed || response.selection_changed {
            self.overlay.refresh(&self.graph, self.extents.as_ref());
        }
        if response.graph_changed || response.structure_changed {
            self.search.refresh(&self.graph);
            self.dirty = true;
        }
        response
    }
}
