//! End-to-end editing sessions driven through the public `Editor` API.

use std::cell::RefCell;
use std::rc::Rc;

use editor_core::bus::handler;
use editor_core::{
    Editor, EditorConfig, EditorEvent, ElementId, EventKind, HandlePosition, LayoutDescription,
    Point, ShapeKind, Snapshot,
};

const SINGLE_TEXT: &str = r#"{
    "canvas": {"width": 400, "height": 300, "backgroundColor": "white"},
    "elements": [
        {"id": "t", "type": "text", "content": "Hello", "x": 10, "y": 10, "width": 100, "height": 30}
    ]
}"#;

fn editor_with(layout: &str) -> Editor {
    let mut editor = Editor::default();
    let layout = LayoutDescription::from_json(layout).expect("layout json");
    editor.load_layout(&layout).expect("load layout");
    editor
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn position(editor: &Editor, id: &str) -> (f32, f32) {
    let record = editor.element(&ElementId::new(id)).expect("element");
    (record.geometry.x, record.geometry.y)
}

fn capture_events(editor: &Editor, kind: EventKind) -> Rc<RefCell<Vec<EditorEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    editor.bus().subscribe(
        kind,
        &handler(move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        }),
    );
    log
}

#[test]
fn drag_then_undo_and_redo() {
    let mut editor = editor_with(SINGLE_TEXT);
    let id = ElementId::new("t");
    editor.select(Some(&id)).expect("select");

    editor.pointer_down(Point::new(50.0, 20.0)).expect("down");
    editor.pointer_move(Point::new(60.0, 30.0));
    editor.pointer_up(Point::new(70.0, 40.0)).expect("up");
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 30.0) && approx(y, 30.0));

    assert!(editor.undo().expect("undo"));
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 10.0) && approx(y, 10.0));

    assert!(editor.redo().expect("redo"));
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 30.0) && approx(y, 30.0));
}

#[test]
fn restored_elements_remain_interactive() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.select(Some(&ElementId::new("t"))).expect("select");
    editor.drag_selected_by(100.0, 0.0).expect("drag");
    editor.undo().expect("undo");

    // The restored element must still respond to a click and a drag.
    let target = editor.pointer_down(Point::new(20.0, 20.0)).expect("down");
    assert_eq!(target, editor_core::PointerTarget::Element(ElementId::new("t")));
    editor.pointer_up(Point::new(25.0, 20.0)).expect("up");
    let (x, _) = position(&editor, "t");
    assert!(approx(x, 15.0));
}

#[test]
fn drag_deltas_follow_current_zoom() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.select(Some(&ElementId::new("t"))).expect("select");
    editor.set_zoom(2.0);
    editor.drag_selected_by(40.0, 20.0).expect("drag");
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 30.0) && approx(y, 20.0));
}

#[test]
fn add_then_delete_fires_once_and_forgets_id() {
    let mut editor = editor_with(SINGLE_TEXT);
    let deleted = capture_events(&editor, EventKind::ElementDeleted);

    let id = editor.add_shape(ShapeKind::Rectangle).expect("add shape");
    editor.delete_selected().expect("delete");

    assert!(!editor.session().store().contains(&id));
    assert_eq!(deleted.borrow().len(), 1);
    let err = editor.select(Some(&id)).expect_err("deleted id");
    assert!(err.is_not_found());
    assert!(editor.selected().is_none());
}

#[test]
fn selected_events_chain_previous_to_current() {
    let mut editor = editor_with(
        r#"{"canvas": {"width": 300, "height": 300}, "elements": [
            {"id": "a", "type": "shape", "x": 0, "y": 0, "width": 50, "height": 50},
            {"id": "b", "type": "shape", "x": 100, "y": 0, "width": 50, "height": 50},
            {"id": "c", "type": "text", "x": 200, "y": 0, "width": 50, "height": 50}
        ]}"#,
    );
    let selected = capture_events(&editor, EventKind::ElementSelected);

    for id in ["a", "b", "b", "c", "a"] {
        editor.select(Some(&ElementId::new(id))).expect("select");
        let marked = editor
            .session()
            .visuals()
            .iter()
            .filter(|visual| visual.is_selected())
            .count();
        assert_eq!(marked, 1);
    }
    editor.deselect();

    let mut last = None;
    for event in selected.borrow().iter() {
        let EditorEvent::ElementSelected { current, previous } = event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(previous, &last);
        last.clone_from(current);
    }
    assert!(last.is_none());
}

#[test]
fn undo_walk_matches_recorded_states() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.select(Some(&ElementId::new("t"))).expect("select");

    let mut states = vec![Snapshot::capture(editor.session())];
    editor.drag_selected_by(5.0, 5.0).expect("drag");
    states.push(Snapshot::capture(editor.session()));
    editor
        .resize_selected(HandlePosition::E, 40.0, 0.0)
        .expect("resize");
    states.push(Snapshot::capture(editor.session()));
    editor.add_text().expect("add");
    states.push(Snapshot::capture(editor.session()));

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo().expect("undo"));
        assert_eq!(&Snapshot::capture(editor.session()), expected);
    }
    for expected in states.iter().skip(1) {
        assert!(editor.redo().expect("redo"));
        assert_eq!(&Snapshot::capture(editor.session()), expected);
    }
}

#[test]
fn new_commit_after_undo_drops_redo() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.select(Some(&ElementId::new("t"))).expect("select");
    editor.drag_selected_by(10.0, 0.0).expect("drag");
    editor.undo().expect("undo");
    editor.select(Some(&ElementId::new("t"))).expect("select");
    editor.drag_selected_by(0.0, 10.0).expect("drag");

    assert!(!editor.can_redo());
    assert!(!editor.redo().expect("redo"));
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 10.0) && approx(y, 20.0));
}

#[test]
fn resize_never_goes_below_minimum() {
    let mut editor = editor_with(SINGLE_TEXT);
    let id = ElementId::new("t");
    for handle in HandlePosition::ALL {
        editor.select(Some(&id)).expect("select");
        editor
            .resize_selected(handle, 5000.0, 5000.0)
            .expect("resize out");
        editor
            .resize_selected(handle, -5000.0, -5000.0)
            .expect("resize in");
        let record = editor.element(&id).expect("element");
        assert!(record.geometry.width >= 20.0, "{handle} width");
        assert!(record.geometry.height >= 20.0, "{handle} height");
    }
}

#[test]
fn zoom_leaves_geometry_alone() {
    let mut editor = editor_with(SINGLE_TEXT);
    let before = Snapshot::capture(editor.session());
    for factor in [0.05, 0.37, 1.0, 2.5, 9.0] {
        editor.set_zoom(factor);
        editor.zoom_in();
        editor.zoom_out();
    }
    editor.fit_to_view(200.0, 150.0);
    assert_eq!(Snapshot::capture(editor.session()), before);
}

#[test]
fn history_keeps_latest_after_eviction() {
    let mut editor = Editor::new(EditorConfig::default());
    for _ in 0..60 {
        editor.add_shape(ShapeKind::Circle).expect("add");
    }
    assert_eq!(editor.history().len(), 50);
    assert_eq!(editor.history().current_index(), 49);
    assert_eq!(
        editor.history().current(),
        Some(&Snapshot::capture(editor.session()))
    );
}

#[test]
fn failing_subscriber_does_not_block_others() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.bus().subscribe(
        EventKind::ElementSelected,
        &handler(|_| Err("panel exploded".into())),
    );
    let selected = capture_events(&editor, EventKind::ElementSelected);
    editor.select(Some(&ElementId::new("t"))).expect("select");
    assert_eq!(selected.borrow().len(), 1);
}

#[test]
fn rejected_generation_keeps_canvas() {
    let mut editor = editor_with(SINGLE_TEXT);
    let request = editor_core::GenerationRequest::new("", 400, 300);
    let layout = LayoutDescription::from_json(SINGLE_TEXT).expect("layout");
    assert!(editor.apply_generated(&request, layout).is_err());

    let bad_canvas = LayoutDescription::from_json(r#"{"canvas": {"width": 0, "height": 10}}"#)
        .expect("layout");
    assert!(editor.load_layout(&bad_canvas).is_err());
    assert_eq!(editor.session().store().len(), 1);
}

#[test]
fn reload_during_drag_abandons_gesture() {
    let mut editor = editor_with(SINGLE_TEXT);
    editor.select(Some(&ElementId::new("t"))).expect("select");
    editor.pointer_down(Point::new(50.0, 20.0)).expect("down");
    editor.pointer_move(Point::new(150.0, 120.0));

    let layout = LayoutDescription::from_json(SINGLE_TEXT).expect("layout");
    editor.load_layout(&layout).expect("reload");
    assert!(editor.session().busy().is_none());

    let recorded = editor.history().len();
    editor.pointer_up(Point::new(150.0, 120.0)).expect("up");
    let (x, y) = position(&editor, "t");
    assert!(approx(x, 10.0) && approx(y, 10.0));
    assert_eq!(editor.history().len(), recorded);
}
