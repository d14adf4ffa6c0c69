//! HTTP transport to the vision model.

use crate::config::DetectConfig;
use crate::error::DetectError;
use crate::reply::parse_chat_response;
use crate::request::build_request;
use redact_core::BoundingBox;
use std::future::Future;
use std::time::{Duration, Instant};

/// Anything that can turn an image + instruction into boxes.
///
/// Implementations are stateless with respect to sessions: gating one
/// request at a time is the caller's job.
pub trait Detector {
    fn detect(
        &self,
        image: &[u8],
        mime: &str,
        instruction: &str,
    ) -> impl Future<Output = Result<Vec<BoundingBox>, DetectError>> + Send;
}

/// Chat-completions client. One POST per [`detect`](Detector::detect).
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    config: DetectConfig,
}

impl DetectionClient {
    pub fn new(config: DetectConfig) -> Result<Self, DetectError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| DetectError::RequestFailed {
            status: None,
            message: e.to_string(),
        })?;
        Ok(Self::with_http(config, http))
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS roots, ...).
    pub fn with_http(config: DetectConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }
}

impl Detector for DetectionClient {
    async fn detect(
        &self,
        image: &[u8],
        mime: &str,
        instruction: &str,
    ) -> Result<Vec<BoundingBox>, DetectError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(DetectError::MissingCredential)?;
        let body = build_request(&self.config, image, mime, instruction);

        log::info!(
            "detect: POST {} model={} image={}B",
            self.config.endpoint,
            self.config.model,
            image.len()
        );
        let started = Instant::now();

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // Unreadable error body: keep the status, leave the message empty.
            let text = response.text().await.unwrap_or_default();
            log::warn!("detect: HTTP {status}: {text}");
            return Err(DetectError::RequestFailed {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        let text = response.text().await.map_err(transport_error)?;
        let boxes = parse_chat_response(&text)?;
        log::info!(
            "detect: {} box(es) in {} ms",
            boxes.len(),
            started.elapsed().as_millis()
        );
        Ok(boxes)
    }
}

fn transport_error(e: reqwest::Error) -> DetectError {
    DetectError::RequestFailed {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
