use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AiCallError {
    /// A required secret is missing; nothing was sent.
    #[error("{0} is not configured")]
    Configuration(&'static str),
    #[error("invalid inference request: {0}")]
    InvalidRequest(String),
    /// Non-retryable status or an unusable response body.
    #[error("inference API error ({status}): {message}")]
    Upstream { status: u16, message: String },
    /// Retryable failure that survived every attempt. `status` is `None` for network errors.
    #[error("inference API unavailable ({status:?}): {message}")]
    Transient { status: Option<u16>, message: String },
}

impl AiCallError {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AiCallError::Configuration(_) | AiCallError::InvalidRequest(_) => None,
            AiCallError::Upstream { status, .. } => Some(*status),
            AiCallError::Transient { status, .. } => *status,
        }
    }
}
