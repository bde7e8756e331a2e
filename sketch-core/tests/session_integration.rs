//! Session Integration Tests
//!
//! Drives the stroke state machine through mixed pointer/touch sequences:
//! - Stroke lifecycle and log growth
//! - Undo/clear command semantics
//! - Content presence
//! - Event scripts loaded from JSON

use proptest::prelude::*;
use sketch_core::{
    CanvasGeometry, CanvasSession, Color, InputEvent, PointerPhase, SessionState, Tool,
    ToolConfig, TouchPhase,
};

/// Draw a two-point pointer stroke.
fn draw_line(session: &mut CanvasSession, from: (f32, f32), to: (f32, f32)) {
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Down, from.0, from.1));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Move, to.0, to.1));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Up, to.0, to.1));
}

fn mounted_session() -> CanvasSession {
    let mut session = CanvasSession::default();
    session.set_geometry(CanvasGeometry::identity(800, 600));
    session
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_pointer_leave_commits_stroke() {
    let mut session = mounted_session();
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Down, 10.0, 10.0));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Move, 30.0, 10.0));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Leave, 900.0, 10.0));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.stroke_count(), 1);
}

#[test]
fn test_touch_cancel_commits_stroke() {
    let mut session = mounted_session();
    let _ = session.handle_event(&InputEvent::touch(TouchPhase::Start, 10.0, 10.0));
    let _ = session.handle_event(&InputEvent::touch(TouchPhase::Move, 20.0, 20.0));
    let _ = session.handle_event(&InputEvent::touch(TouchPhase::Cancel, 20.0, 20.0));
    assert_eq!(session.stroke_count(), 1);
}

#[test]
fn test_single_point_stroke_is_stored() {
    let mut session = mounted_session();
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Down, 10.0, 10.0));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Up, 10.0, 10.0));
    assert_eq!(session.stroke_count(), 1);
    let stroke = session.strokes().last().expect("stored dot");
    assert!(stroke.is_degenerate());
    // A committed stroke counts as content even when it is a single dot.
    assert!(session.has_content());
}

#[test]
fn test_mixed_tools_keep_their_style() {
    let mut session = mounted_session();
    for (i, tool) in Tool::ALL.into_iter().enumerate() {
        let config = ToolConfig::new(Color::rgb(10, 20, 30), 4.0, tool).expect("config");
        session.set_tool_config(config);
        #[allow(clippy::cast_precision_loss)]
        let y = 50.0 * i as f32;
        draw_line(&mut session, (0.0, y), (100.0, y));
    }

    let tools: Vec<Tool> = session.strokes().iter().map(|s| s.tool()).collect();
    assert_eq!(tools, Tool::ALL.to_vec());
    let eraser = session.strokes().last().expect("eraser");
    assert_eq!(eraser.color(), Color::WHITE);
    assert!((eraser.width() - 8.0).abs() < f32::EPSILON);
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_clear_from_any_state() {
    let mut session = mounted_session();
    assert!(session.clear().is_changed(), "clear on empty still refreshes");
    draw_line(&mut session, (0.0, 0.0), (10.0, 10.0));
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Down, 5.0, 5.0));
    let _ = session.clear();
    assert!(!session.has_content());
    assert_eq!(session.state(), SessionState::Idle);
    // A release after clear has nothing to commit.
    let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Up, 5.0, 5.0));
    assert_eq!(session.stroke_count(), 0);
}

#[test]
fn test_events_from_json_script() {
    let script = r#"[
        {"type":"Pointer","data":{"phase":"down","x":1.0,"y":1.0}},
        {"type":"Pointer","data":{"phase":"move","x":2.0,"y":2.0}},
        {"type":"Pointer","data":{"phase":"move","x":3.0,"y":3.0}},
        {"type":"Pointer","data":{"phase":"up","x":3.0,"y":3.0}},
        {"type":"Touch","data":{"phase":"move","touches":[{"id":0,"x":9.0,"y":9.0}]}}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).expect("script");
    let mut session = mounted_session();
    let changed = events
        .iter()
        .filter(|e| session.handle_event(e).is_changed())
        .count();
    assert_eq!(changed, 4, "trailing idle move is ignored");
    assert_eq!(session.strokes().last().map(sketch_core::Stroke::len), Some(3));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_undo_removes_exactly_one(count in 1usize..20) {
        let mut session = mounted_session();
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            draw_line(&mut session, (x, 0.0), (x, 10.0));
        }
        prop_assert_eq!(session.stroke_count(), count);

        let _ = session.undo();
        prop_assert_eq!(session.stroke_count(), count - 1);

        for _ in 1..count {
            let _ = session.undo();
        }
        prop_assert_eq!(session.stroke_count(), 0);
        prop_assert!(!session.has_content());
    }

    #[test]
    fn prop_point_order_follows_event_order(
        xs in prop::collection::vec(0.0f32..800.0, 2..40)
    ) {
        let mut session = mounted_session();
        let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Down, xs[0], 0.0));
        for &x in &xs[1..] {
            let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Move, x, 0.0));
        }
        let _ = session.handle_event(&InputEvent::pointer(PointerPhase::Up, 0.0, 0.0));

        let stroke = session.strokes().last().expect("committed");
        let recorded: Vec<f32> = stroke.points().iter().map(|p| p.x).collect();
        prop_assert_eq!(recorded, xs);
    }
}
