use thiserror::Error;

use super::TransportAttempt;

#[derive(Debug, Clone, Error)]
pub enum ShippingError {
    /// The remote answered with a non-success status.
    #[error("{} Error: {status} - {message}", .attempt.error_label())]
    Api {
        attempt: TransportAttempt,
        status: u16,
        message: String,
    },

    /// The remote could not be reached or the body could not be read.
    #[error("{} Error: {message}", .attempt.error_label())]
    Transport { attempt: TransportAttempt, message: String },

    /// The remote answered but the body is not JSON.
    #[error("{} Error: {status} - invalid JSON body: {message}", .attempt.error_label())]
    Decode {
        attempt: TransportAttempt,
        status: u16,
        message: String,
    },

    /// Every transport in the chain failed; carries the last attempt's error.
    #[error("{0}")]
    ApiCallFailed(Box<ShippingError>),

    /// A workflow step failed; `source` is shown verbatim after the context.
    #[error("{context}: {source}")]
    Operation {
        context: String,
        source: Box<ShippingError>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not connected to a platform")]
    NotConnected,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("Credential lookup failed: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ShippingError {
    pub fn operation(context: impl Into<String>, source: ShippingError) -> Self {
        ShippingError::Operation {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// HTTP status carried by this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ShippingError::Api { status, .. } | ShippingError::Decode { status, .. } => Some(*status),
            ShippingError::ApiCallFailed(inner) | ShippingError::Operation { source: inner, .. } => inner.status(),
            _ => None,
        }
    }

    /// 429 and 403 usually mean the relay throttled us rather than the platform
    /// rejecting the call. Only used for logging.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.status(), Some(429) | Some(403))
    }

    pub fn attempt(&self) -> Option<TransportAttempt> {
        match self {
            ShippingError::Api { attempt, .. }
            | ShippingError::Transport { attempt, .. }
            | ShippingError::Decode { attempt, .. } => Some(*attempt),
            ShippingError::ApiCallFailed(inner) | ShippingError::Operation { source: inner, .. } => inner.attempt(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShippingError>;
