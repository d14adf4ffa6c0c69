//! Input abstraction layer.
//!
//! Normalizes mouse, touch and pen events from the host into a unified
//! `InputEvent` in normalized image coordinates, so the editor never sees
//! display pixels.

use redact_core::NormPoint;

/// A pointer event over the displayed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { at: NormPoint },

    /// Pointer moved while over the surface.
    PointerMove { at: NormPoint },

    /// Pointer released.
    PointerUp { at: NormPoint },

    /// Pointer tracking lost (left the surface, touch cancelled).
    PointerLeave,
}

impl InputEvent {
    /// Build from display-space coordinates on a surface of
    /// `display_w × display_h`. `None` when the surface has no size yet.
    pub fn pointer_down(x: f32, y: f32, display_w: f32, display_h: f32) -> Option<Self> {
        NormPoint::from_display(x, y, display_w, display_h).map(|at| Self::PointerDown { at })
    }

    pub fn pointer_move(x: f32, y: f32, display_w: f32, display_h: f32) -> Option<Self> {
        NormPoint::from_display(x, y, display_w, display_h).map(|at| Self::PointerMove { at })
    }

    pub fn pointer_up(x: f32, y: f32, display_w: f32, display_h: f32) -> Option<Self> {
        NormPoint::from_display(x, y, display_w, display_h).map(|at| Self::PointerUp { at })
    }

    /// Extract position if the event carries one.
    pub fn position(&self) -> Option<NormPoint> {
        match self {
            Self::PointerDown { at } | Self::PointerMove { at } | Self::PointerUp { at } => {
                Some(*at)
            }
            Self::PointerLeave => None,
        }
    }
}
