//! Pointer and keyboard interaction state machine.
//!
//! The controller turns raw input into graph mutations, selection changes
//! and viewport pans. Every event is handled to completion in one call;
//! there is never work left in flight.

use crate::graph::GraphStore;
use crate::input::{ClickTracker, DoubleClickConfig, Key, MouseButton, PointerEvent, TouchEvent};
use crate::node::{NodeExtents, NodeId};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Moving a node. `grab_offset` is pointer minus node corner, in canvas units.
    DraggingNode { node: NodeId, grab_offset: Vec2 },
    /// Panning the canvas. `anchor` is pointer minus canvas origin, in screen units.
    Panning { anchor: Vec2 },
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, InteractionState::Idle)
    }
}

/// A request to open the text editor for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub node: NodeId,
    /// Text at the time of the request.
    pub text: String,
}

/// What an event did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Nodes or connections were modified.
    pub graph_changed: bool,
    /// Node structure changed (creation, deletion), so layouts must re-run.
    pub structure_changed: bool,
    /// Selection or connect mode changed.
    pub selection_changed: bool,
    /// The canvas was panned or zoomed.
    pub view_changed: bool,
    pub edit_request: Option<EditRequest>,
}

impl Response {
    /// Check if the event had any effect at all.
    pub fn is_noop(&self) -> bool {
        *self == Response::default()
    }

    /// Fold another response into this one.
    pub fn merge(&mut self, other: Response) {
        self.graph_changed |= other.graph_changed;
        self.structure_changed |= other.structure_changed;
        self.selection_changed |= other.selection_changed;
        self.view_changed |= other.view_changed;
        if other.edit_request.is_some() {
            self.edit_request = other.edit_request;
        }
    }
}

/// Interaction state machine shared by mouse and touch input.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    clicks: ClickTracker,
    /// Last pointer position seen, in screen coordinates.
    last_pointer: Point,
}

impl InteractionController {
    pub fn new(double_click: DoubleClickConfig) -> Self {
        Self {
            clicks: ClickTracker::new(double_click),
            ..Self::default()
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Drop any drag in progress.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        graph: &mut GraphStore,
        viewport: &mut Viewport,
        extents: &dyn NodeExtents,
    ) -> Response {
        self.last_pointer = event.position();
        match event {
            PointerEvent::Down { position, button: MouseButton::Left } => {
                self.pointer_down(position, graph, viewport, extents)
            }
            PointerEvent::Down { .. } => Response::default(),
            PointerEvent::Move { position } => self.pointer_move(position, graph, viewport),
            PointerEvent::Up { .. } => {
                if self.state.is_dragging() {
                    log::debug!("Drag finished");
                }
                self.state = InteractionState::Idle;
                Response::default()
            }
        }
    }

    /// Single touches behave like the primary mouse button; multi-touch is ignored.
    pub fn handle_touch(
        &mut self,
        event: &TouchEvent,
        graph: &mut GraphStore,
        viewport: &mut Viewport,
        extents: &dyn NodeExtents,
    ) -> Response {
        match event.to_pointer(self.last_pointer) {
            Some(pointer) => self.handle_pointer(pointer, graph, viewport, extents),
            None => Response::default(),
        }
    }

    pub fn handle_key(&mut self, key: &Key, graph: &mut GraphStore) -> Response {
        let mut response = Response::default();
        match key {
            Key::Delete => {
                if let Some(id) = graph.selected() {
                    if matches!(self.state, InteractionState::DraggingNode { node, .. } if node == id) {
                        self.state = InteractionState::Idle;
                    }
                    if graph.delete_node(id).is_changed() {
                        response.graph_changed = true;
                        response.structure_changed = true;
                        response.selection_changed = true;
                    }
                }
            }
            Key::Escape => {
                self.state = InteractionState::Idle;
                if graph.is_connecting() {
                    graph.set_connecting(false);
                    response.selection_changed = true;
                } else if graph.clear_selection().is_changed() {
                    response.selection_changed = true;
                }
            }
            Key::Other(_) => {}
        }
        response
    }

    /// Turn connect mode on or off. The selection is left as is.
    pub fn toggle_connect(&mut self, graph: &mut GraphStore) -> Response {
        let connecting = graph.toggle_connecting();
        log::debug!("Connect mode {}", if connecting { "on" } else { "off" });
        Response {
            selection_changed: true,
            ..Response::default()
        }
    }

    fn pointer_down(
        &mut self,
        screen: Point,
        graph: &mut GraphStore,
        viewport: &Viewport,
        extents: &dyn NodeExtents,
    ) -> Response {
        let mut response = Response::default();
        let world = viewport.screen_to_world(screen);

        let Some(hit) = graph.node_at(world, extents) else {
            self.clicks.reset();
            self.state = InteractionState::Panning {
                anchor: screen.to_vec2() - viewport.offset,
            };
            log::debug!("Pan started");
            return response;
        };

        match graph.selected() {
            Some(selected) if graph.is_connecting() && selected != hit => {
                response.graph_changed = graph.connect(selected, hit).is_changed();
                graph.set_connecting(false);
                response.selection_changed = true;
                self.state = InteractionState::Idle;
            }
            _ => {
                response.selection_changed = graph.select(hit).is_changed();
                let corner = graph.find_node(hit).map(|n| n.position()).unwrap_or(world);
                self.state = InteractionState::DraggingNode {
                    node: hit,
                    grab_offset: world - corner,
                };
                log::debug!("Dragging node {}", hit);
            }
        }

        if self.clicks.press(screen) {
            if let Some(node) = graph.find_node(hit) {
                response.edit_request = Some(EditRequest {
                    node: hit,
                    text: node.text().to_string(),
                });
            }
        }
        response
    }

    fn pointer_move(&mut self, screen: Point, graph: &mut GraphStore, viewport: &mut Viewport) -> Response {
        match self.state {
            InteractionState::Idle => Response::default(),
            InteractionState::DraggingNode { node, grab_offset } => {
                let world = viewport.screen_to_world(screen);
                Response {
                    graph_changed: graph.move_node(node, world - grab_offset).is_changed(),
                    ..Response::default()
                }
            }
            InteractionState::Panning { anchor } => {
                viewport.offset = screen.to_vec2() - anchor;
                Response {
                    view_changed: true,
                    ..Response::default()
                }
            }
        }
    }
}
