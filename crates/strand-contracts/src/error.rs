use thiserror::Error;

/// Failure taxonomy shared by every studio operation.
///
/// Contract violations keep the offending raw response text on the error
/// value so callers and tests can inspect what the model actually returned.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("response contract violation: {reason}")]
    ResponseContractViolation { reason: String, raw: String },

    #[error("model response contained no inline media part")]
    NoMediaInResponse,

    #[error("generated media fetch failed ({status}): {detail}")]
    UnrecoverableFetchFailure { status: u16, detail: String },

    #[error("media job still pending after {attempts} polls ({waited_s:.1}s)")]
    PollTimeout { attempts: u32, waited_s: f64 },

    #[error("invalid media part: {0}")]
    InvalidMedia(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl StudioError {
    pub fn contract_violation(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResponseContractViolation {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Raw model output attached to a contract violation, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::ResponseContractViolation { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}
