/// Why a detection attempt produced no result.
///
/// An empty `boxes` array is not an error: callers get `Ok(vec![])`.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Transport failure or non-2xx response.
    #[error("detection request failed ({}): {message}", status_label(.status))]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// The model answered, but no JSON object could be recovered from it.
    #[error("model reply is not valid JSON")]
    ResponseUnparsable { raw: String },

    /// No credential configured for the detection service.
    #[error("no API key configured (set REDACT_API_KEY)")]
    MissingCredential,
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

impl DetectError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestFailed {
                status: Some(code), ..
            } => format!("Request failed: {code}"),
            Self::RequestFailed { status: None, .. } => {
                "Request failed: the detection service could not be reached.".to_string()
            }
            Self::ResponseUnparsable { .. } => {
                "Could not read the analysis result. Try a simpler instruction or retry."
                    .to_string()
            }
            Self::MissingCredential => {
                "No API key configured for the detection service.".to_string()
            }
        }
    }

    /// HTTP status attached to a failed request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
