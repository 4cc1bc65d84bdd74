//! Pointer and touch input translation.
//!
//! Input events arrive in viewport coordinates; the engine draws in
//! surface-local coordinates. Mapping is a plain offset subtraction of the
//! surface's on-screen origin. Touch events use the first active touch point.

use serde::{Deserialize, Serialize};

use crate::surface::Point;

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer went down: a stroke begins.
    Start,
    /// Pointer moved while down: the stroke extends.
    Move,
    /// Pointer went up: the stroke completes.
    End,
    /// Gesture aborted (e.g. palm rejection); treated like an end.
    Cancel,
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of the gesture.
    pub phase: PointerPhase,
    /// Horizontal viewport position in pixels.
    pub x: f32,
    /// Vertical viewport position in pixels.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    /// Translate to surface-local coordinates given the surface's on-screen
    /// origin.
    #[must_use]
    pub fn to_surface(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// Horizontal viewport position in pixels.
    pub x: f32,
    /// Vertical viewport position in pixels.
    pub y: f32,
}

/// A touch event with one or more active touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    /// Phase of the gesture.
    pub phase: PointerPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
}

impl TouchInput {
    /// The primary (first) touch point, which drives the stroke.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Reduce to a pointer event at the primary touch point.
    ///
    /// Returns `None` when no touch points remain (an end with all fingers
    /// lifted still carries the phase, so this only happens on malformed
    /// input).
    #[must_use]
    pub fn to_pointer(&self) -> Option<PointerEvent> {
        self.primary_touch()
            .map(|t| PointerEvent::new(self.phase, t.x, t.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_to_surface_subtracts_origin() {
        let event = PointerEvent::new(PointerPhase::Move, 130.0, 245.0);
        let p = event.to_surface(Point::new(100.0, 200.0));
        assert!((p.x - 30.0).abs() < f32::EPSILON);
        assert!((p.y - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn touch_uses_first_active_point() {
        let touch = TouchInput {
            phase: PointerPhase::Start,
            touches: vec![
                TouchPoint {
                    id: 7,
                    x: 50.0,
                    y: 60.0,
                },
                TouchPoint {
                    id: 8,
                    x: 90.0,
                    y: 90.0,
                },
            ],
        };
        let pointer = touch.to_pointer().expect("has touches");
        assert_eq!(pointer.phase, PointerPhase::Start);
        assert!((pointer.x - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_touch_list_yields_no_pointer() {
        let touch = TouchInput {
            phase: PointerPhase::End,
            touches: vec![],
        };
        assert!(touch.to_pointer().is_none());
    }
}
