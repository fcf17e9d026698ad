use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use signed_webhook::signing::{
    Body, KeyResolver, SignedRequest, Signer, Verifier, X_API_KEY, X_ENDPOINT, X_SIGNATURE,
    X_TIMESTAMP,
};
use tracing::{info, warn};

/// Webhook routes the processor calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Authorizations,
    Adjustments,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Authorizations => "/transactions/authorizations",
            Route::Adjustments => "/transactions/adjustments",
        }
    }

    /// Logical tag sent in `X-Endpoint`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Route::Authorizations => "authorizations",
            Route::Adjustments => "adjustments",
        }
    }
}

/// What came back from the receiver.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: Bytes,
    pub signature_valid: bool,
}

/// Plays the processor's side of the exchange: signs a request, sends it,
/// and checks the signature on the reply.
pub struct ProcessorClient {
    http: reqwest::Client,
    base_url: String,
    api_key_id: String,
    signer: Signer,
    verifier: Verifier,
}

impl ProcessorClient {
    pub fn new(base_url: String, api_key_id: String, keys: Arc<dyn KeyResolver>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key_id,
            signer: Signer::new(keys.clone()),
            verifier: Verifier::new(keys),
        }
    }

    pub async fn call(&self, route: Route, body: Vec<u8>) -> Result<Reply> {
        let body = Bytes::from(body);
        let signed = self
            .signer
            .sign(&Body::Present(body.clone()), route.endpoint(), &self.api_key_id)
            .context("signing request")?;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), route.path());
        let response = self
            .http
            .post(&url)
            .header(X_ENDPOINT, &signed.endpoint[..])
            .header(X_TIMESTAMP, &signed.timestamp)
            .header(X_API_KEY, &self.api_key_id)
            .header(X_SIGNATURE, signed.signature.to_string())
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("sending request to {url}"))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.context("reading response body")?;

        if !(200..300).contains(&status) {
            warn!(status, "Receiver rejected the request");
            return Ok(Reply {
                status,
                body,
                signature_valid: false,
            });
        }

        // Responses carry no X-Api-Key; they are signed with ours.
        let mut received = SignedRequest::from_headers(&headers, body.clone())
            .context("reading response signature headers")?;
        received.api_key_id = self.api_key_id.clone();

        let signature_valid = self.verifier.verify(&received);
        if signature_valid {
            info!(status, endpoint = ?received.endpoint, "Response signature verified");
        }

        Ok(Reply {
            status,
            body,
            signature_valid,
        })
    }
}

/// Fail unless the reply was a signed success.
pub fn ensure_verified(reply: &Reply) -> Result<()> {
    if !(200..300).contains(&reply.status) {
        bail!("receiver answered {}", reply.status);
    }
    if !reply.signature_valid {
        bail!("response signature did not verify");
    }
    Ok(())
}
