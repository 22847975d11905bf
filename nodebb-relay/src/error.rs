//! Request-level error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::forum::NotifyError;
use crate::web::signature::SignatureError;

/// Body returned for every signature failure.
pub const INVALID_SIGNATURE: &str = "Invalid signature";

/// Body returned for a signed body that is not JSON.
pub const MALFORMED_PAYLOAD: &str = "Malformed payload";

/// Body returned for upstream failures when error text is masked.
pub const UPSTREAM_ERROR: &str = "nodebb error";

/// Everything that can go wrong while relaying one delivery.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("signature header missing")]
    SignatureMissing,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("malformed payload: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    #[error("nodebb unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("nodebb responded with status {status}")]
    UpstreamRejected { status: StatusCode, body: String },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SignatureMissing | Self::SignatureMismatch => StatusCode::FORBIDDEN,
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) | Self::UpstreamRejected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert to a response, optionally hiding upstream error text.
    ///
    /// Signature failures never say which check failed.
    pub fn into_response_with(self, expose_upstream_errors: bool) -> Response {
        let message = match &self {
            Self::SignatureMissing | Self::SignatureMismatch => INVALID_SIGNATURE.to_string(),
            Self::MalformedRequest(_) => MALFORMED_PAYLOAD.to_string(),
            Self::UpstreamUnreachable(_) | Self::UpstreamRejected { .. } => {
                if expose_upstream_errors {
                    self.to_string()
                } else {
                    UPSTREAM_ERROR.to_string()
                }
            }
        };

        (self.status(), Json(message)).into_response()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.into_response_with(true)
    }
}

impl From<SignatureError> for RelayError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::Missing => Self::SignatureMissing,
            SignatureError::Mismatch => Self::SignatureMismatch,
        }
    }
}

impl From<NotifyError> for RelayError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::Unreachable(e) => Self::UpstreamUnreachable(e),
            NotifyError::Rejected { status, body } => Self::UpstreamRejected { status, body },
        }
    }
}
