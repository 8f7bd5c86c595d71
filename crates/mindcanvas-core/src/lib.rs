//! MindCanvas Core Library
//!
//! Platform-agnostic graph model, layouts and interaction logic for the
//! MindCanvas diagram editor.

pub mod config;
pub mod document;
pub mod edges;
pub mod editor;
pub mod graph;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod node;
pub mod search;
pub mod storage;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use document::{ConnectionRecord, Document, DocumentError, NodeRecord};
pub use edges::{EdgeOverlay, EdgeSegment};
pub use editor::{EditPanel, EditResult, Editor, EditorAction};
pub use graph::{GraphStore, Outcome, Selection};
pub use input::{ClickTracker, DoubleClickConfig, Key, MouseButton, PointerEvent, TouchEvent};
pub use interaction::{EditRequest, InteractionController, InteractionState, Response};
pub use layout::{LayoutConfig, LayoutEngine, LayoutError, LayoutMode, Placement};
pub use node::{Connection, DEFAULT_COLOR, FixedExtent, Node, NodeExtents, NodeId, PALETTE};
pub use search::{Highlight, SearchState};
pub use storage::{MapManager, MapRecord, MapStorage, MapSummary, MemoryStorage, StorageError};
pub use viewport::Viewport;
