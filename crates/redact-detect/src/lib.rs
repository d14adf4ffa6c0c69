//! Detection client for the remote vision-language model.
//!
//! One call = one request/response cycle: fixed system prompt, the image
//! as a data URL, the user's instruction. The model's JSON reply is
//! reduced to normalized [`BoundingBox`]es. No retry, no caching.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod reply;
pub mod request;

#[cfg(feature = "client")]
pub use client::{DetectionClient, Detector};
pub use config::DetectConfig;
pub use error::DetectError;
pub use prompt::{SUGGESTIONS, SYSTEM_PROMPT};
pub use reply::{ModelReply, parse_boxes, parse_chat_response};
pub use request::{ChatRequest, build_request};

pub use redact_core::BoundingBox;
