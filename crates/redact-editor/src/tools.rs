//! Pointer tool: translates input events into editor commands.
//!
//! | Gesture                         | Effect                         |
//! |---------------------------------|--------------------------------|
//! | press on a box, release on it   | remove that box                |
//! | press on background, drag       | draw a new box (live preview)  |
//! | release after drawing           | commit if above the size floor |
//! | pointer leaves the surface      | cancel the gesture             |

use crate::editor::{BoxEditor, EditorCommand, EditorError};
use crate::input::InputEvent;
use redact_core::BoundingBox;
use redact_render::hit_test;

/// Stateless apart from which box was pressed, so a click is only a
/// removal when press and release land on the same box.
///
/// The pressed box is remembered by value as well as index: if the set is
/// replaced between press and release, the index may now name another box.
#[derive(Debug, Clone, Default)]
pub struct PointerTool {
    pressed: Option<(usize, BoundingBox)>,
}

impl PointerTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box currently held down, if any.
    pub fn pressed(&self) -> Option<usize> {
        self.pressed.as_ref().map(|(index, _)| *index)
    }

    pub fn reset(&mut self) {
        self.pressed = None;
    }

    /// Map one event to the commands it implies, given the editor's
    /// current state. Nothing is mutated on the editor.
    pub fn handle(&mut self, event: &InputEvent, editor: &BoxEditor) -> Vec<EditorCommand> {
        match *event {
            InputEvent::PointerDown { at } => {
                let mut commands = Vec::new();
                if editor.is_drawing() {
                    // Release was lost somewhere; start over.
                    commands.push(EditorCommand::CancelDraw);
                }
                self.pressed = hit_test(editor.boxes(), at)
                    .and_then(|index| Some((index, editor.boxes().get(index)?.clone())));
                if self.pressed.is_none() {
                    commands.push(EditorCommand::BeginDraw(at));
                }
                commands
            }
            InputEvent::PointerMove { at } => {
                if editor.is_drawing() {
                    vec![EditorCommand::UpdateDraw(at)]
                } else {
                    vec![]
                }
            }
            InputEvent::PointerUp { at } => {
                let pressed = self.pressed.take();
                if editor.is_drawing() {
                    return vec![EditorCommand::UpdateDraw(at), EditorCommand::EndDraw];
                }
                match (pressed, hit_test(editor.boxes(), at)) {
                    (Some((index, pressed)), Some(hit))
                        if hit == index && editor.boxes().get(hit) == Some(&pressed) =>
                    {
                        vec![EditorCommand::Remove(index)]
                    }
                    _ => vec![],
                }
            }
            InputEvent::PointerLeave => {
                self.pressed = None;
                if editor.is_drawing() {
                    vec![EditorCommand::CancelDraw]
                } else {
                    vec![]
                }
            }
        }
    }

    /// Handle `event` and apply the resulting commands.
    ///
    /// Returns `true` when the active set changed (re-render needed).
    pub fn dispatch(
        &mut self,
        editor: &mut BoxEditor,
        event: &InputEvent,
    ) -> Result<bool, EditorError> {
        let mut changed = false;
        for command in self.handle(event, editor) {
            changed |= editor.apply(command)?;
        }
        Ok(changed)
    }
}
