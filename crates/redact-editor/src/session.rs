//! One redaction session: image, instruction, box editor, status.
//!
//! Status moves `Idle → Ready → Analyzing → Ready | Error`. Only one
//! detection may be in flight; [`Session::start_detection`] refuses a
//! second. Each image selection and each reset bumps a generation counter,
//! and a detection result is only applied if its ticket's generation still
//! matches, so late replies for a replaced image are dropped.

use crate::editor::{BoxEditor, EditorError};
use crate::input::InputEvent;
use crate::tools::PointerTool;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use redact_core::BoundingBox;
use redact_detect::DetectError;
use redact_render::{CompositeOptions, RenderError, SourceImage};

/// Shown when a detection succeeds but reports no regions.
pub const NO_MATCH_MESSAGE: &str =
    "Nothing matched the description. Try describing it differently, or draw boxes by hand.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    /// No image selected.
    #[default]
    Idle,
    Ready,
    Analyzing,
    /// Last detection failed. The session stays editable.
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no image selected")]
    NoImage,
    #[error("instruction is empty")]
    EmptyInstruction,
    #[error("a detection request is already in flight")]
    DetectionInFlight,
    #[error(transparent)]
    Image(#[from] RenderError),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// Everything a detector needs, detached from the session so the session
/// isn't borrowed while the request is pending.
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    pub generation: u64,
    pub image: Vec<u8>,
    pub mime: &'static str,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// Boxes replaced the active set.
    Applied { count: usize },
    /// Success with zero boxes; [`NO_MATCH_MESSAGE`] is set.
    NoMatches,
    /// Detection failed; the user-facing message is set.
    Failed,
    /// Result belonged to an older generation and was dropped.
    Stale,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    status: Status,
    image: Option<SourceImage>,
    instruction: String,
    editor: BoxEditor,
    tool: PointerTool,
    message: Option<String>,
    options: CompositeOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompositeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last user-facing message (no-match notice or error), if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    pub fn editor(&self) -> &BoxEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut BoxEditor {
        &mut self.editor
    }

    pub fn options(&self) -> &CompositeOptions {
        &self.options
    }

    /// Takes effect on the next render or export.
    pub fn set_options(&mut self, options: CompositeOptions) {
        self.options = options;
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        self.editor.boxes()
    }

    // ─── Image ───────────────────────────────────────────────────────────

    /// Decode and adopt a new image. Boxes from the previous image are
    /// dropped and any pending detection becomes stale.
    ///
    /// On a decode failure the session is left exactly as it was.
    pub fn select_image(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        let image = SourceImage::decode(bytes)?;
        log::info!("session: image {}x{} selected", image.width(), image.height());
        self.generation += 1;
        self.image = Some(image);
        self.editor.clear();
        self.tool.reset();
        self.message = None;
        self.status = Status::Ready;
        Ok(())
    }

    // ─── Detection ───────────────────────────────────────────────────────

    /// Enter `Analyzing` and hand out the request inputs.
    pub fn start_detection(&mut self) -> Result<DetectionTicket, SessionError> {
        if self.status == Status::Analyzing {
            return Err(SessionError::DetectionInFlight);
        }
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let instruction = self.instruction.trim();
        if instruction.is_empty() {
            return Err(SessionError::EmptyInstruction);
        }
        let ticket = DetectionTicket {
            generation: self.generation,
            image: image.bytes().to_vec(),
            mime: image.mime_type(),
            instruction: instruction.to_string(),
        };
        self.status = Status::Analyzing;
        self.message = None;
        log::info!("session: detection started (generation {})", self.generation);
        Ok(ticket)
    }

    /// Apply the result of the detection started with `generation`.
    ///
    /// Failures never touch the image or the active set.
    pub fn finish_detection(
        &mut self,
        generation: u64,
        result: Result<Vec<BoundingBox>, DetectError>,
    ) -> DetectionOutcome {
        if generation != self.generation || self.status != Status::Analyzing {
            log::warn!(
                "session: dropping stale detection result (generation {generation}, current {})",
                self.generation
            );
            return DetectionOutcome::Stale;
        }
        match result {
            Ok(boxes) if boxes.is_empty() => {
                self.status = Status::Ready;
                self.message = Some(NO_MATCH_MESSAGE.to_string());
                DetectionOutcome::NoMatches
            }
            Ok(boxes) => {
                let count = boxes.len();
                self.editor.seed(boxes);
                self.tool.reset();
                self.status = Status::Ready;
                self.message = None;
                DetectionOutcome::Applied { count }
            }
            Err(e) => {
                log::warn!("session: detection failed: {e}");
                self.status = Status::Error;
                self.message = Some(e.user_message());
                DetectionOutcome::Failed
            }
        }
    }

    /// Start, await `detector`, finish.
    #[cfg(feature = "client")]
    pub async fn detect_with<D: redact_detect::Detector>(
        &mut self,
        detector: &D,
    ) -> Result<DetectionOutcome, SessionError> {
        let ticket = self.start_detection()?;
        let result = detector
            .detect(&ticket.image, ticket.mime, &ticket.instruction)
            .await;
        Ok(self.finish_detection(ticket.generation, result))
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Feed a pointer event through the tool. `true` when the set changed.
    pub fn handle_pointer(&mut self, event: &InputEvent) -> Result<bool, SessionError> {
        Ok(self.tool.dispatch(&mut self.editor, event)?)
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Composite the current set over the image, at native resolution.
    pub fn render(&self) -> Option<RgbaImage> {
        let image = self.image.as_ref()?;
        Some(redact_render::render(
            image.pixels(),
            self.editor.boxes(),
            &self.options,
        ))
    }

    /// Render and encode for download, named after `at`.
    pub fn export(&self, at: DateTime<Utc>) -> Result<Export, SessionError> {
        let surface = self.render().ok_or(SessionError::NoImage)?;
        let png = redact_render::export_png(&surface)?;
        Ok(Export {
            file_name: redact_render::export_file_name(at),
            png,
        })
    }

    /// Discard everything. Results still in flight become stale.
    pub fn reset(&mut self) {
        log::info!("session: reset");
        let generation = self.generation + 1;
        *self = Self {
            generation,
            options: self.options,
            ..Self::default()
        };
    }
}
