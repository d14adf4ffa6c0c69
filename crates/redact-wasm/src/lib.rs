//! WASM bridge for Redact: exposes the redaction session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the file
//! picker, the `fetch` to the vision service and the download link; this
//! side owns every coordinate, the box set and the pixels.
//!
//! Detection is split in two so the HTTP call can stay in JS:
//! `begin_detection` returns the request body plus a generation number,
//! and `finish_detection` takes the raw response with that number back.

mod surface;

use chrono::DateTime;
use redact_core::{Color, PercentRect};
use redact_detect::{
    DetectConfig, DetectError, SUGGESTIONS, build_request, parse_chat_response,
};
use redact_editor::{DetectionOutcome, InputEvent, Session, SessionError, Status};
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing session controller.
///
/// `width`/`height` are the image's *displayed* size in CSS pixels, used
/// only to map pointer positions into normalized space.
#[wasm_bindgen]
pub struct RedactCanvas {
    session: Session,
    width: f32,
    height: f32,
}

#[wasm_bindgen]
impl RedactCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: Session::new(),
            width: width as f32,
            height: height as f32,
        }
    }

    /// Displayed size changed (layout, zoom, rotation).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width as f32;
        self.height = height as f32;
    }

    // ─── Image ───────────────────────────────────────────────────────────

    /// Adopt an uploaded file. Returns JSON:
    /// `{"ok":true,"width":w,"height":h}` or `{"ok":false,"error":"..."}`.
    pub fn load_image(&mut self, bytes: &[u8]) -> String {
        match self.session.select_image(bytes.to_vec()) {
            Ok(()) => {
                let (width, height) = self
                    .session
                    .image()
                    .map(|img| (img.width(), img.height()))
                    .unwrap_or_default();
                json!({ "ok": true, "width": width, "height": height }).to_string()
            }
            Err(e) => error_json(&e),
        }
    }

    pub fn set_instruction(&mut self, instruction: &str) {
        self.session.set_instruction(instruction);
    }

    /// Set the redaction fill from a hex string (`#000`, `#1A1A1AFF`, ...).
    /// Returns `false` and keeps the current fill if the string is invalid.
    pub fn set_fill(&mut self, hex: &str) -> bool {
        let Some(fill) = Color::from_hex(hex) else {
            log::warn!("invalid fill colour {hex:?}");
            return false;
        };
        let mut options = *self.session.options();
        options.fill = fill;
        self.session.set_options(options);
        true
    }

    /// Current fill as `#RRGGBB` / `#RRGGBBAA`.
    pub fn fill(&self) -> String {
        self.session.options().fill.to_hex()
    }

    // ─── Detection ───────────────────────────────────────────────────────

    /// Enter analyzing and build the chat-completions request.
    ///
    /// `config_json` is a (possibly partial) detection config; missing
    /// fields take their defaults. Returns JSON
    /// `{"ok":true,"generation":n,"endpoint":"...","body":{...}}` or
    /// `{"ok":false,"error":"..."}`. The caller adds its own credential.
    pub fn begin_detection(&mut self, config_json: &str) -> String {
        let config: DetectConfig = if config_json.trim().is_empty() {
            DetectConfig::default()
        } else {
            match serde_json::from_str(config_json) {
                Ok(c) => c,
                Err(e) => return json!({ "ok": false, "error": e.to_string() }).to_string(),
            }
        };
        let ticket = match self.session.start_detection() {
            Ok(t) => t,
            Err(e) => return error_json(&e),
        };
        let body = build_request(&config, &ticket.image, ticket.mime, &ticket.instruction);
        json!({
            "ok": true,
            "generation": ticket.generation,
            "endpoint": config.endpoint,
            "body": body,
        })
        .to_string()
    }

    /// Hand back the service's reply for `generation`.
    ///
    /// `status` is the HTTP status, or `0` when the request never got a
    /// response. Returns JSON `{"outcome":"applied"|"no_matches"|"failed"|
    /// "stale", ...}`.
    pub fn finish_detection(&mut self, generation: f64, status: u16, body: &str) -> String {
        let result = match status {
            0 => Err(DetectError::RequestFailed {
                status: None,
                message: body.to_string(),
            }),
            200..=299 => parse_chat_response(body),
            code => Err(DetectError::RequestFailed {
                status: Some(code),
                message: body.to_string(),
            }),
        };
        let outcome = self.session.finish_detection(generation as u64, result);
        outcome_json(&outcome, self.session.message())
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Returns `true` when a re-render is needed.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        let event = InputEvent::pointer_down(x, y, self.width, self.height);
        self.dispatch(event)
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        let event = InputEvent::pointer_move(x, y, self.width, self.height);
        self.dispatch(event)
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        let event = InputEvent::pointer_up(x, y, self.width, self.height);
        self.dispatch(event)
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.dispatch(Some(InputEvent::PointerLeave))
    }

    /// Remove a box by position (overlay click). `false` if out of range.
    pub fn remove_box(&mut self, index: usize) -> bool {
        self.session.editor_mut().remove(index).is_ok()
    }

    // ─── Overlay ─────────────────────────────────────────────────────────

    /// Active boxes as JSON `[{"top","left","width","height","label"}]`,
    /// in percent of the displayed image.
    pub fn overlay_json(&self) -> String {
        let items: Vec<serde_json::Value> = self
            .session
            .boxes()
            .iter()
            .map(|b| {
                let mut v = percent_json(&b.to_percent_rect());
                v["label"] = json!(b.label());
                v
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    /// In-progress draw rectangle as JSON, or `null`.
    pub fn preview_json(&self) -> String {
        match self.session.editor().preview() {
            Some(rect) => percent_json(&rect).to_string(),
            None => "null".to_string(),
        }
    }

    /// Active boxes in normalized coordinates, as
    /// `[{"xmin","ymin","xmax","ymax","label"?}]`.
    pub fn boxes_json(&self) -> String {
        serde_json::to_string(self.session.boxes()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn box_count(&self) -> usize {
        self.session.boxes().len()
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Draw the composited image. Returns `false` when there is no image
    /// or the canvas rejected the pixels.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> bool {
        let Some(composite) = self.session.render() else {
            return false;
        };
        match surface::draw(ctx, &composite) {
            Ok(()) => true,
            Err(e) => {
                log::error!("render failed: {e:?}");
                false
            }
        }
    }

    /// PNG bytes of the redacted image, empty when there is nothing to export.
    pub fn export_png(&self) -> Vec<u8> {
        let Some(composite) = self.session.render() else {
            return Vec::new();
        };
        match redact_render::export_png(&composite) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("export failed: {e}");
                Vec::new()
            }
        }
    }

    /// Download name for an export at `timestamp_ms` (JS `Date.now()`).
    pub fn export_file_name(&self, timestamp_ms: f64) -> String {
        let at = DateTime::from_timestamp_millis(timestamp_ms as i64).unwrap_or_default();
        redact_render::export_file_name(at)
    }

    // ─── Status ──────────────────────────────────────────────────────────

    /// `"idle"`, `"ready"`, `"analyzing"` or `"error"`.
    pub fn status(&self) -> String {
        status_name(self.session.status()).to_string()
    }

    /// Message to show the user (no-match notice or failure), if any.
    pub fn message(&self) -> Option<String> {
        self.session.message().map(str::to_string)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}

impl RedactCanvas {
    fn dispatch(&mut self, event: Option<InputEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };
        let drawing = self.session.editor().is_drawing();
        match self.session.handle_pointer(&event) {
            // The preview moves even when the set doesn't.
            Ok(changed) => changed || drawing || self.session.editor().is_drawing(),
            Err(e) => {
                log::warn!("pointer event rejected: {e}");
                false
            }
        }
    }
}

/// Example instructions for the prompt field, as a JS array of strings.
#[wasm_bindgen]
pub fn suggestions() -> js_sys::Array {
    SUGGESTIONS.iter().map(|s| JsValue::from_str(s)).collect()
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Ready => "ready",
        Status::Analyzing => "analyzing",
        Status::Error => "error",
    }
}

fn error_json(e: &SessionError) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn percent_json(rect: &PercentRect) -> serde_json::Value {
    serde_json::to_value(rect).unwrap_or(serde_json::Value::Null)
}

fn outcome_json(outcome: &DetectionOutcome, message: Option<&str>) -> String {
    let value = match outcome {
        DetectionOutcome::Applied { count } => json!({ "outcome": "applied", "count": count }),
        DetectionOutcome::NoMatches => json!({ "outcome": "no_matches", "message": message }),
        DetectionOutcome::Failed => json!({ "outcome": "failed", "message": message }),
        DetectionOutcome::Stale => json!({ "outcome": "stale" }),
    };
    value.to_string()
}

/// Set up console error panic hook for better WASM debugging.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Redact WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
