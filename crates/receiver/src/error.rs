use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};

/// Reasons a signed message is rejected.
///
/// Every variant is a per-request rejection. The detail is for operator
/// logs only and is never sent back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("unsupported signature algorithm in {0:?}")]
    UnsupportedAlgorithm(String),
    #[error("no secret registered for api key {0:?}")]
    KeyNotFound(String),
    #[error("signature is not valid base64: {0}")]
    MalformedSignature(#[from] base64::DecodeError),
    #[error("signature mismatch: received {received}, computed {computed}")]
    Mismatch { received: String, computed: String },
    #[error("header {0} is not a valid header value")]
    InvalidHeader(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
    #[error("Rejected signed request: {0}")]
    Signature(#[from] SignatureError),
    #[error("Failed to read request body: {0}")]
    Body(#[from] BytesRejection),
    #[error("Failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Signature(_) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            ServerError::Body(rejection) => rejection.into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something wrong happened.",
            )
                .into_response(),
        }
    }
}
