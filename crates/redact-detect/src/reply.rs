//! Model reply → normalized boxes.
//!
//! The model is asked for bare JSON but often wraps it in a code fence or
//! surrounds it with prose. Recovery is shallow: strip fence markers, take
//! the span from the first `{` to the last `}`, parse.
//! Anything else is `ResponseUnparsable`.

use crate::error::DetectError;
use redact_core::{BoundingBox, DEFAULT_MODEL_LABEL, normalize};
use serde::Deserialize;
use serde_json::Value;

/// Parsed model reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelReply {
    /// Reasoning the prompt asks for. Any JSON shape; logged, otherwise unused.
    #[serde(default)]
    pub thought: Option<Value>,
    /// Missing or `null` means "nothing matched".
    #[serde(default)]
    pub boxes: Option<Vec<ModelBox>>,
}

/// One region as reported: `[x1, y1, x2, y2]` in any order, any range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelBox {
    pub box_2d: [f64; 4],
    /// Usually a string. Numbers and booleans are taken as their text,
    /// anything else falls back to [`DEFAULT_MODEL_LABEL`].
    #[serde(default)]
    pub label: Option<Value>,
}

impl ModelBox {
    pub fn normalized(&self) -> BoundingBox {
        let [x1, y1, x2, y2] = self.box_2d;
        normalize(x1, y1, x2, y2).with_label(self.label_text())
    }

    fn label_text(&self) -> String {
        match &self.label {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => DEFAULT_MODEL_LABEL.to_string(),
        }
    }
}

impl ModelReply {
    /// Every reported box through [`normalize`], in reply order.
    pub fn into_boxes(self) -> Vec<BoundingBox> {
        self.boxes
            .unwrap_or_default()
            .iter()
            .map(ModelBox::normalized)
            .collect()
    }
}

/// Strip code-fence markers and cut out the outermost `{ … }` span.
pub fn extract_json_block(content: &str) -> &str {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn strip_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "")
}

/// Parse the text the model produced.
pub fn parse_model_content(content: &str) -> Result<ModelReply, DetectError> {
    let cleaned = strip_fences(content);
    let block = extract_json_block(&cleaned);
    let unparsable = || DetectError::ResponseUnparsable {
        raw: content.to_string(),
    };

    let value: Value = serde_json::from_str(block).map_err(|e| {
        log::warn!("model reply is not JSON ({e}): {content}");
        unparsable()
    })?;
    // Any JSON that isn't an object simply has no `boxes`.
    if !value.is_object() {
        return Ok(ModelReply::default());
    }
    let reply: ModelReply = serde_json::from_value(value).map_err(|e| {
        log::warn!("model reply has malformed boxes ({e}): {content}");
        unparsable()
    })?;
    if let Some(thought) = &reply.thought {
        log::debug!("model thought: {thought}");
    }
    Ok(reply)
}

/// Parse model text straight to boxes.
pub fn parse_boxes(content: &str) -> Result<Vec<BoundingBox>, DetectError> {
    parse_model_content(content).map(ModelReply::into_boxes)
}

/// `choices[0].message.content` of a chat-completions body, `"{}"` when absent.
pub fn message_content(body: &Value) -> &str {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or("{}")
}

/// Parse a full chat-completions response body to boxes.
pub fn parse_chat_response(body: &str) -> Result<Vec<BoundingBox>, DetectError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        log::warn!("detection response body is not JSON ({e})");
        DetectError::ResponseUnparsable {
            raw: body.to_string(),
        }
    })?;
    let content = message_content(&value);
    log::debug!("model content: {content}");
    parse_boxes(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn coords(b: &BoundingBox) -> (u16, u16, u16, u16) {
        (b.xmin(), b.ymin(), b.xmax(), b.ymax())
    }

    #[test]
    fn two_boxes_ordered() {
        let boxes = parse_boxes(
            r#"{"boxes":[{"box_2d":[300,100,700,180]},{"box_2d":[500,400,650,450]}]}"#,
        )
        .unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(coords(&boxes[0]), (300, 100, 700, 180));
        assert_eq!(coords(&boxes[1]), (500, 400, 650, 450));
        for b in &boxes {
            assert!(b.xmin() < b.xmax() && b.ymin() < b.ymax());
        }
    }

    #[test]
    fn empty_boxes_is_ok() {
        assert!(parse_boxes(r#"{"boxes":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_or_null_boxes_is_empty() {
        assert!(parse_boxes(r#"{"thought":"nothing here"}"#).unwrap().is_empty());
        assert!(parse_boxes(r#"{"boxes":null}"#).unwrap().is_empty());
        assert!(parse_boxes("[1, 2, 3]").unwrap().is_empty());
    }

    #[test]
    fn reversed_x_is_normalized() {
        let boxes = parse_boxes(r#"{"boxes":[{"box_2d":[700,100,300,180]}]}"#).unwrap();
        assert_eq!(coords(&boxes[0]), (300, 100, 700, 180));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let boxes = parse_boxes(r#"{"boxes":[{"box_2d":[-4,990.6,1001,12]}]}"#).unwrap();
        assert_eq!(coords(&boxes[0]), (0, 12, 1000, 991));
    }

    #[test]
    fn labels_default_when_missing_or_blank() {
        let boxes = parse_boxes(
            r#"{"boxes":[{"box_2d":[1,1,9,9],"label":"avatar"},{"box_2d":[1,1,9,9]},{"box_2d":[1,1,9,9],"label":""}]}"#,
        )
        .unwrap();
        let labels: Vec<_> = boxes.iter().map(|b| b.label()).collect();
        assert_eq!(
            labels,
            vec![Some("avatar"), Some(DEFAULT_MODEL_LABEL), Some(DEFAULT_MODEL_LABEL)]
        );
    }

    #[test]
    fn odd_thought_and_label_types_are_tolerated() {
        let boxes =
            parse_boxes(r#"{"thought":["layout"],"boxes":[{"box_2d":[300,100,700,180]}]}"#)
                .unwrap();
        assert_eq!(coords(&boxes[0]), (300, 100, 700, 180));

        let boxes = parse_boxes(
            r#"{"thought":{"step":1},"boxes":[{"box_2d":[1,1,9,9],"label":7},{"box_2d":[1,1,9,9],"label":["x"]},{"box_2d":[1,1,9,9],"label":null}]}"#,
        )
        .unwrap();
        let labels: Vec<_> = boxes.iter().map(|b| b.label()).collect();
        assert_eq!(
            labels,
            vec![Some("7"), Some(DEFAULT_MODEL_LABEL), Some(DEFAULT_MODEL_LABEL)]
        );
    }

    #[test]
    fn code_fence_and_prose_are_stripped() {
        let content = "Sure! Here you go:\n```json\n{\n  \"thought\": \"one amount\",\n  \"boxes\": [{\"label\": \"balance\", \"box_2d\": [300, 100, 700, 180]}]\n}\n```\nLet me know.";
        let reply = parse_model_content(content).unwrap();
        assert_eq!(reply.thought, Some(json!("one amount")));
        assert_eq!(reply.into_boxes().len(), 1);
    }

    #[test]
    fn garbage_is_unparsable() {
        for content in ["I could not find anything.", "{\"boxes\": [", "{ not json }"] {
            match parse_boxes(content) {
                Err(DetectError::ResponseUnparsable { raw }) => assert_eq!(raw, content),
                other => panic!("expected ResponseUnparsable for {content:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_box_is_unparsable() {
        let err = parse_boxes(r#"{"boxes":[{"box_2d":[1,2,3]}]}"#).unwrap_err();
        assert!(matches!(err, DetectError::ResponseUnparsable { .. }));

        let err = parse_boxes(r#"{"boxes":[{"label":"no coords"}]}"#).unwrap_err();
        assert!(matches!(err, DetectError::ResponseUnparsable { .. }));
    }

    #[test]
    fn chat_response_content_is_extracted() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"boxes\":[{\"box_2d\":[20,300,150,430],\"label\":\"left avatar\"}]}"
                }
            }]
        });
        let boxes = parse_chat_response(&body.to_string()).unwrap();
        assert_eq!(coords(&boxes[0]), (20, 300, 150, 430));
        assert_eq!(boxes[0].label(), Some("left avatar"));
    }

    #[test]
    fn chat_response_without_content_is_empty() {
        assert!(parse_chat_response(r#"{"choices":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn chat_response_body_not_json() {
        assert!(matches!(
            parse_chat_response("<html>502 Bad Gateway</html>"),
            Err(DetectError::ResponseUnparsable { .. })
        ));
    }
}
