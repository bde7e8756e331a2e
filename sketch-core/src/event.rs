//! Input events for stroke capture.
//!
//! Coordinates are raw viewport coordinates; the session maps them into
//! backing-pixel space before recording.

use serde::{Deserialize, Serialize};

/// Phase of a pointer (mouse/pen) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the canvas element.
    Leave,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in viewport coordinates.
    pub x: f32,
    /// Y position in viewport coordinates.
    pub y: f32,
}

/// A touch event with zero or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Create a single-finger touch event.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint { id: 0, x, y }])
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// A pointer (mouse/pen) event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this pointer event.
    pub phase: PointerPhase,
    /// X position in viewport coordinates.
    pub x: f32,
    /// Y position in viewport coordinates.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }
}

/// What an input event asks the stroke state machine to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeAction {
    /// Start a stroke at the given viewport position.
    Begin(f32, f32),
    /// Extend the active stroke to the given viewport position.
    Extend(f32, f32),
    /// Finish the active stroke.
    End,
    /// Nothing to do (e.g. a touch with no touch points).
    None,
}

/// All input events the canvas can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse/pen) event.
    Pointer(PointerEvent),
    /// Raw touch event.
    Touch(TouchEvent),
}

impl InputEvent {
    /// Pointer event shorthand.
    #[must_use]
    pub fn pointer(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self::Pointer(PointerEvent::new(phase, x, y))
    }

    /// Single-finger touch event shorthand.
    #[must_use]
    pub fn touch(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::Touch(TouchEvent::single(phase, x, y))
    }

    /// Reduce the event to a stroke action.
    ///
    /// Touch start/move events without a touch point yield [`StrokeAction::None`].
    /// Touch end and cancel finish the stroke whether or not points remain.
    #[must_use]
    pub fn action(&self) -> StrokeAction {
        match self {
            Self::Pointer(p) => match p.phase {
                PointerPhase::Down => StrokeAction::Begin(p.x, p.y),
                PointerPhase::Move => StrokeAction::Extend(p.x, p.y),
                PointerPhase::Up | PointerPhase::Leave => StrokeAction::End,
            },
            Self::Touch(t) => match (t.phase, t.primary_touch()) {
                (TouchPhase::Start, Some(p)) => StrokeAction::Begin(p.x, p.y),
                (TouchPhase::Move, Some(p)) => StrokeAction::Extend(p.x, p.y),
                (TouchPhase::Start | TouchPhase::Move, None) => StrokeAction::None,
                (TouchPhase::End | TouchPhase::Cancel, _) => StrokeAction::End,
            },
        }
    }
}
