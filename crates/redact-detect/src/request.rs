//! Outbound chat-completions payload.

use crate::config::DetectConfig;
use crate::prompt::{SYSTEM_PROMPT, user_text};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: Vec<ContentPart> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Encoded image bytes as a `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// The single request sent for one detection attempt.
pub fn build_request(
    config: &DetectConfig,
    image: &[u8],
    mime: &str,
    instruction: &str,
) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![
            Message::System {
                content: SYSTEM_PROMPT.to_string(),
            },
            Message::User {
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url(mime, image),
                        },
                    },
                    ContentPart::Text {
                        text: user_text(instruction),
                    },
                ],
            },
        ],
        temperature: config.temperature,
        stream: false,
    }
}
