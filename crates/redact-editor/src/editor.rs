//! Box editor: the active redaction set plus the in-progress draw gesture.
//!
//! States are `Empty` / `Populated` (derived from the set), with an
//! orthogonal `drawing` flag that is simply `gesture.is_some()`.
//!
//! Boxes are addressed by their current position in the set. Removing
//! shifts later indices down; callers must re-resolve indices (e.g. by hit
//! testing) after every mutation rather than caching them.

use redact_core::{BoundingBox, MANUAL_LABEL, NormPoint, PercentRect};

/// A drawn box must be strictly larger than this on both axes, in
/// normalized units. Smaller drags are treated as accidental clicks.
pub const MIN_DRAW_SIZE: u16 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("a draw gesture is already in progress")]
    AlreadyDrawing,
    #[error("no draw gesture in progress")]
    NotDrawing,
    #[error("box index {index} out of range for {len} box(es)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Populated,
}

/// Pointer-down → pointer-up interaction, both ends in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawGesture {
    pub start: NormPoint,
    pub current: NormPoint,
}

impl DrawGesture {
    /// The candidate box the gesture currently spans.
    pub fn candidate(&self) -> BoundingBox {
        BoundingBox::from_points(self.start, self.current)
    }
}

/// One editor operation. Tools emit these; [`BoxEditor::apply`] runs them.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    Seed(Vec<BoundingBox>),
    BeginDraw(NormPoint),
    UpdateDraw(NormPoint),
    EndDraw,
    CancelDraw,
    Remove(usize),
}

/// Owns the active box set for one editing session.
#[derive(Debug, Clone, Default)]
pub struct BoxEditor {
    boxes: Vec<BoundingBox>,
    gesture: Option<DrawGesture>,
}

impl BoxEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn state(&self) -> EditorState {
        if self.boxes.is_empty() {
            EditorState::Empty
        } else {
            EditorState::Populated
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&DrawGesture> {
        self.gesture.as_ref()
    }

    /// Replace the whole set with `new_boxes`.
    ///
    /// An empty input is a no-op, so a detection run that found nothing
    /// never wipes boxes already on screen. Returns whether the set changed.
    pub fn seed(&mut self, new_boxes: Vec<BoundingBox>) -> bool {
        if new_boxes.is_empty() {
            log::debug!("seed: empty input ignored ({} box(es) kept)", self.boxes.len());
            return false;
        }
        log::debug!("seed: {} box(es) replace {}", new_boxes.len(), self.boxes.len());
        self.boxes = new_boxes;
        true
    }

    pub fn begin_draw(&mut self, at: NormPoint) -> Result<(), EditorError> {
        if self.gesture.is_some() {
            log::warn!("begin_draw while already drawing");
            return Err(EditorError::AlreadyDrawing);
        }
        log::debug!("draw: begin at ({:.1}, {:.1})", at.x, at.y);
        self.gesture = Some(DrawGesture {
            start: at,
            current: at,
        });
        Ok(())
    }

    /// Move the free corner. Drives the preview only; the set is untouched.
    pub fn update_draw(&mut self, at: NormPoint) -> Result<(), EditorError> {
        let Some(gesture) = self.gesture.as_mut() else {
            log::warn!("update_draw without a gesture");
            return Err(EditorError::NotDrawing);
        };
        gesture.current = at;
        Ok(())
    }

    /// Finish the gesture. Appends the box if it clears [`MIN_DRAW_SIZE`]
    /// on both axes and returns its index; the gesture ends either way.
    pub fn end_draw(&mut self) -> Result<Option<usize>, EditorError> {
        let Some(gesture) = self.gesture.take() else {
            log::warn!("end_draw without a gesture");
            return Err(EditorError::NotDrawing);
        };
        let candidate = gesture.candidate();
        if candidate.width() > MIN_DRAW_SIZE && candidate.height() > MIN_DRAW_SIZE {
            self.boxes.push(candidate.with_label(MANUAL_LABEL));
            log::debug!("draw: committed box #{}", self.boxes.len() - 1);
            Ok(Some(self.boxes.len() - 1))
        } else {
            log::debug!(
                "draw: discarded {}x{} gesture",
                candidate.width(),
                candidate.height()
            );
            Ok(None)
        }
    }

    /// Drop the gesture without creating a box.
    pub fn cancel_draw(&mut self) -> Result<(), EditorError> {
        if self.gesture.take().is_none() {
            log::warn!("cancel_draw without a gesture");
            return Err(EditorError::NotDrawing);
        }
        log::debug!("draw: cancelled");
        Ok(())
    }

    /// Remove the box at `index`. Any gesture in progress is unaffected.
    pub fn remove(&mut self, index: usize) -> Result<BoundingBox, EditorError> {
        if index >= self.boxes.len() {
            log::warn!("remove: index {index} out of range ({})", self.boxes.len());
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.boxes.len(),
            });
        }
        log::debug!("remove: box #{index}");
        Ok(self.boxes.remove(index))
    }

    /// Drop every box and any gesture.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.gesture = None;
    }

    /// Run one command. Returns `true` when the active set changed.
    pub fn apply(&mut self, command: EditorCommand) -> Result<bool, EditorError> {
        match command {
            EditorCommand::Seed(boxes) => Ok(self.seed(boxes)),
            EditorCommand::BeginDraw(at) => self.begin_draw(at).map(|_| false),
            EditorCommand::UpdateDraw(at) => self.update_draw(at).map(|_| false),
            EditorCommand::EndDraw => self.end_draw().map(|added| added.is_some()),
            EditorCommand::CancelDraw => self.cancel_draw().map(|_| false),
            EditorCommand::Remove(index) => self.remove(index).map(|_| true),
        }
    }

    // ─── Overlay ─────────────────────────────────────────────────────────

    /// Live preview of the gesture, if drawing.
    pub fn preview(&self) -> Option<PercentRect> {
        self.gesture.map(|g| g.candidate().to_percent_rect())
    }

    /// Overlay placement for every active box, in set order.
    pub fn overlay(&self) -> Vec<PercentRect> {
        self.boxes.iter().map(BoundingBox::to_percent_rect).collect()
    }
}
