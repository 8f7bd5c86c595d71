//! End-to-end editing session through the public API.

use kurbo::Point;
use mindcanvas_core::{
    Document, EditResult, Editor, EditorAction, GraphStore, Key, LayoutEngine, LayoutMode,
    MouseButton, PointerEvent, TouchEvent,
};

fn click(editor: &mut Editor, x: f64, y: f64) {
    let position = Point::new(x, y);
    editor.handle_pointer(PointerEvent::Down { position, button: MouseButton::Left });
    editor.handle_pointer(PointerEvent::Up { position, button: MouseButton::Left });
}

#[test]
fn test_build_connect_and_save_a_map() {
    let mut editor = Editor::new();
    editor.set_layout(LayoutMode::Horizontal).unwrap();

    // Root sits at (500, 300); pick it and add two children.
    click(&mut editor, 520.0, 320.0);
    editor.perform(EditorAction::AddNode).unwrap();
    editor.perform(EditorAction::AddNode).unwrap();
    assert_eq!(editor.graph().node_count(), 3);
    assert_eq!(editor.graph().root().unwrap().child_ids(), &[2, 3]);

    // Horizontal lane down from the root.
    let pos = |id| editor.graph().find_node(id).unwrap().position();
    assert_eq!(pos(2), Point::new(700.0, 300.0));
    assert_eq!(pos(3), Point::new(700.0, 400.0));

    // Connect the two children.
    click(&mut editor, 710.0, 310.0);
    editor.perform(EditorAction::ToggleConnect).unwrap();
    click(&mut editor, 710.0, 410.0);
    assert!(editor.graph().has_connection(2, 3));
    assert_eq!(editor.overlay().len(), 3);

    // Rename through a double click. Pressing empty canvas first starts a
    // fresh click sequence.
    click(&mut editor, 100.0, 100.0);
    let position = Point::new(710.0, 410.0);
    editor.handle_pointer(PointerEvent::Down { position, button: MouseButton::Left });
    editor.handle_pointer(PointerEvent::Up { position, button: MouseButton::Left });
    let request = editor
        .handle_pointer(PointerEvent::Down { position, button: MouseButton::Left })
        .edit_request
        .expect("double click asks for an edit");
    editor.handle_pointer(PointerEvent::Up { position, button: MouseButton::Left });
    editor.finish_edit(&request, EditResult::Replaced("Budget".to_string()));
    assert_eq!(editor.graph().find_node(3).unwrap().text(), "Budget");

    // The document survives a JSON round trip into a fresh editor.
    let json = editor.export().to_json().unwrap();
    let mut restored = Editor::new();
    restored.set_layout(LayoutMode::Horizontal).unwrap();
    restored.import_json(&json).unwrap();
    assert_eq!(restored.export().nodes, editor.export().nodes);
    assert_eq!(restored.export().connections, editor.export().connections);
}

#[test]
fn test_drag_and_pan_with_touch() {
    let mut editor = Editor::new();
    editor.handle_touch(&TouchEvent::Start(vec![Point::new(510.0, 310.0)]));
    editor.handle_touch(&TouchEvent::Move(vec![Point::new(560.0, 330.0)]));
    editor.handle_touch(&TouchEvent::End(vec![]));
    assert_eq!(editor.graph().root().unwrap().position(), Point::new(550.0, 320.0));

    editor.handle_touch(&TouchEvent::Start(vec![Point::new(10.0, 10.0)]));
    editor.handle_touch(&TouchEvent::Move(vec![Point::new(40.0, 50.0)]));
    editor.handle_touch(&TouchEvent::End(vec![]));
    assert_eq!(editor.viewport().offset.x, 30.0);
    assert_eq!(editor.viewport().offset.y, 40.0);
    // Panning never moves nodes.
    assert_eq!(editor.graph().root().unwrap().position(), Point::new(550.0, 320.0));
}

#[test]
fn test_delete_and_escape_keys() {
    let mut editor = Editor::new();
    click(&mut editor, 510.0, 310.0);
    editor.perform(EditorAction::AddNode).unwrap();
    editor.perform(EditorAction::ToggleConnect).unwrap();

    editor.handle_key(&Key::Escape);
    assert!(!editor.graph().is_connecting());
    assert_eq!(editor.graph().selected(), Some(1));

    editor.handle_key(&Key::Delete);
    assert_eq!(editor.graph().node_count(), 1);
    assert_eq!(editor.graph().connection_count(), 0);
    assert!(editor.graph().root().unwrap().child_ids().is_empty());
}

#[test]
fn test_layouts_are_deterministic() {
    let mut graph = GraphStore::new();
    for i in 0..6 {
        graph.create_node(format!("n{i}"), Point::ZERO, None);
    }
    graph.connect(1, 2);
    graph.connect(1, 3);
    graph.connect(2, 4);
    let snapshot = Document::export(&graph);

    let engine = LayoutEngine::default();
    for mode in LayoutMode::ALL {
        let mut a = GraphStore::new();
        let mut b = GraphStore::new();
        snapshot.import_into(&mut a).unwrap();
        snapshot.import_into(&mut b).unwrap();
        engine.apply(mode, &mut a).unwrap();
        engine.apply(mode, &mut b).unwrap();
        engine.apply(mode, &mut b).unwrap();
        assert_eq!(Document::export(&a), Document::export(&b), "{mode} is not idempotent");
    }
}
