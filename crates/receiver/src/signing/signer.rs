use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use super::algorithm::{SignatureAlgorithm, SignatureHeader};
use super::canonical::{Body, CanonicalMessage};
use super::keys::KeyResolver;
use super::{X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use crate::error::SignatureError;

/// Headers that carry a signature on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub endpoint: Bytes,
    pub timestamp: String,
    pub signature: SignatureHeader,
}

impl SignatureHeaders {
    /// `X-Endpoint`, `X-Timestamp` and `X-Signature` as a header map.
    pub fn to_header_map(&self) -> Result<HeaderMap, SignatureError> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            X_ENDPOINT,
            HeaderValue::from_bytes(&self.endpoint)
                .map_err(|_| SignatureError::InvalidHeader(X_ENDPOINT))?,
        );
        headers.insert(
            X_TIMESTAMP,
            HeaderValue::from_str(&self.timestamp)
                .map_err(|_| SignatureError::InvalidHeader(X_TIMESTAMP))?,
        );
        headers.insert(
            X_SIGNATURE,
            HeaderValue::from_str(&self.signature.to_string())
                .map_err(|_| SignatureError::InvalidHeader(X_SIGNATURE))?,
        );
        Ok(headers)
    }
}

/// Produces signatures for outbound messages.
///
/// Signing is sync and CPU-bound.
#[derive(Clone)]
pub struct Signer {
    keys: Arc<dyn KeyResolver>,
    algorithm: SignatureAlgorithm,
}

impl Signer {
    pub fn new(keys: Arc<dyn KeyResolver>) -> Self {
        Self {
            keys,
            algorithm: SignatureAlgorithm::HmacSha256,
        }
    }

    /// Sign `body` for `endpoint` with the secret behind `api_key_id`,
    /// stamping the current Unix time.
    ///
    /// `endpoint` is echoed byte for byte, so a tag read off a request
    /// header can be passed straight through.
    pub fn sign(
        &self,
        body: &Body,
        endpoint: impl AsRef<[u8]>,
        api_key_id: &str,
    ) -> Result<SignatureHeaders, SignatureError> {
        self.sign_at(body, endpoint, api_key_id, &unix_timestamp())
    }

    /// Same as [`Signer::sign`] with a caller supplied timestamp.
    pub fn sign_at(
        &self,
        body: &Body,
        endpoint: impl AsRef<[u8]>,
        api_key_id: &str,
        timestamp: &str,
    ) -> Result<SignatureHeaders, SignatureError> {
        let endpoint = endpoint.as_ref();
        let secret = self
            .keys
            .resolve(api_key_id)
            .ok_or_else(|| SignatureError::KeyNotFound(api_key_id.to_string()))?;

        let message = CanonicalMessage::new(timestamp.as_bytes(), endpoint, body.as_bytes());
        let tag = self.algorithm.compute(&secret, &message);

        Ok(SignatureHeaders {
            endpoint: Bytes::copy_from_slice(endpoint),
            timestamp: timestamp.to_string(),
            signature: SignatureHeader::new(self.algorithm, STANDARD.encode(tag)),
        })
    }
}

fn unix_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}
