use std::sync::Arc;

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use tracing::warn;

use super::algorithm::SignatureHeader;
use super::canonical::CanonicalMessage;
use super::keys::KeyResolver;
use super::{X_API_KEY, X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use crate::error::SignatureError;

/// A signed message exactly as it came off the wire.
///
/// `endpoint`, `timestamp` and `body` hold the raw bytes, untouched by any
/// parser or text decoding.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub endpoint: Bytes,
    pub timestamp: Bytes,
    pub api_key_id: String,
    /// Unparsed `X-Signature` value.
    pub signature: String,
    pub body: Bytes,
}

impl SignedRequest {
    /// Collect the signed fields from request headers.
    ///
    /// A missing header reads as empty, which then fails
    /// verification on its own terms.
    pub fn from_headers(headers: &HeaderMap, body: Bytes) -> Result<Self, SignatureError> {
        Ok(Self {
            endpoint: header_bytes(headers, X_ENDPOINT),
            timestamp: header_bytes(headers, X_TIMESTAMP),
            api_key_id: header_str(headers, X_API_KEY)?,
            signature: header_str(headers, X_SIGNATURE)?,
            body,
        })
    }
}

fn header_bytes(headers: &HeaderMap, name: &'static str) -> Bytes {
    headers
        .get(name)
        .map(|value| Bytes::copy_from_slice(value.as_bytes()))
        .unwrap_or_default()
}

fn header_str(headers: &HeaderMap, name: &'static str) -> Result<String, SignatureError> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(str::to_string)
            .map_err(|_| SignatureError::InvalidHeader(name)),
        None => Ok(String::new()),
    }
}

/// Checks inbound signatures against the shared secret.
#[derive(Clone)]
pub struct Verifier {
    keys: Arc<dyn KeyResolver>,
}

impl Verifier {
    pub fn new(keys: Arc<dyn KeyResolver>) -> Self {
        Self { keys }
    }

    /// `true` only when the signature over timestamp, endpoint and raw body
    /// checks out. Failures are logged without secret material.
    pub fn verify(&self, request: &SignedRequest) -> bool {
        match self.check(request) {
            Ok(()) => true,
            Err(err) => {
                warn!(api_key_id = %request.api_key_id, endpoint = ?request.endpoint, "{err}");
                false
            }
        }
    }

    /// Like [`Verifier::verify`], returning the reason for a rejection.
    pub fn check(&self, request: &SignedRequest) -> Result<(), SignatureError> {
        let header: SignatureHeader = request.signature.parse()?;

        let secret = self
            .keys
            .resolve(&request.api_key_id)
            .ok_or_else(|| SignatureError::KeyNotFound(request.api_key_id.clone()))?;

        let message = CanonicalMessage::new(
            &request.timestamp,
            &request.endpoint,
            Some(request.body.as_ref()),
        );

        let received = STANDARD.decode(header.value())?;

        let algorithm = header.algorithm();
        if algorithm.verify(&secret, &message, &received) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch {
                received: header.value().to_string(),
                computed: STANDARD.encode(algorithm.compute(&secret, &message)),
            })
        }
    }
}
