use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::ServerError;
use crate::signing::{Body, SignedRequest, Signer, Verifier};

/// Extracts a [`SignedRequest`] and rejects it unless the signature verifies.
///
/// Handlers taking this extractor never see unauthenticated input.
impl<S> FromRequest<S> for SignedRequest
where
    S: Send + Sync,
    Arc<Verifier>: FromRef<S>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state).await?;

        let request = SignedRequest::from_headers(&headers, body)?;

        let verifier = Arc::<Verifier>::from_ref(state);
        if let Err(err) = verifier.check(&request) {
            warn!(
                api_key_id = %request.api_key_id,
                endpoint = ?request.endpoint,
                "Invalid signature, aborting: {err}"
            );
            return Err(err.into());
        }

        debug!(endpoint = ?request.endpoint, "Signature verified");
        Ok(request)
    }
}

/// A response whose signature headers are fixed before its body exists on
/// the wire.
///
/// Only constructible through [`SignedResponse::sign`].
#[derive(Debug)]
pub struct SignedResponse {
    headers: HeaderMap,
    body: Body,
}

impl SignedResponse {
    /// Sign `body` for the endpoint and key of the verified `request`.
    pub fn sign(signer: &Signer, request: &SignedRequest, body: Body) -> Result<Self, ServerError> {
        let signature = signer.sign(&body, &request.endpoint, &request.api_key_id)?;

        // The endpoint is echoed from a header we already accepted, so this
        // only fails on a broken signer.
        let mut headers = signature
            .to_header_map()
            .map_err(|err| ServerError::Unexpected(err.into()))?;
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        Ok(Self { headers, body })
    }
}

impl IntoResponse for SignedResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            Body::Present(bytes) => axum::body::Body::from(bytes),
            Body::Absent => axum::body::Body::empty(),
        };

        (StatusCode::OK, self.headers, body).into_response()
    }
}
