pub mod editor;
pub mod input;
pub mod session;
pub mod tools;

pub use editor::{BoxEditor, DrawGesture, EditorCommand, EditorError, EditorState, MIN_DRAW_SIZE};
pub use input::InputEvent;
pub use session::{
    DetectionOutcome, DetectionTicket, Export, NO_MATCH_MESSAGE, Session, SessionError, Status,
};
pub use tools::PointerTool;
