mod signed;

pub use signed::SignedResponse;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::error::ServerError;
use crate::signing::{Body, KeyResolver, SignedRequest, Signer, Verifier};
use crate::transactions::TransactionProcessor;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<Verifier>,
    pub signer: Arc<Signer>,
    pub processor: Arc<dyn TransactionProcessor>,
}

impl AppState {
    /// Verifier and signer share one key registry.
    pub fn new(keys: Arc<dyn KeyResolver>, processor: Arc<dyn TransactionProcessor>) -> Self {
        Self {
            verifier: Arc::new(Verifier::new(keys.clone())),
            signer: Arc::new(Signer::new(keys)),
            processor,
        }
    }
}

impl FromRef<AppState> for Arc<Verifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/transactions/authorizations", post(authorizations))
        .route("/transactions/adjustments", post(adjustments))
        // `{*rest}` needs at least one character, so the bare slash gets its own route.
        .route("/transactions/adjustments/", post(adjustments))
        .route("/transactions/adjustments/{*rest}", post(adjustments))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState, max_body_bytes: usize) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, router(state, max_body_bytes))
        .await
        .context("serving")?;

    Ok(())
}

/// Card transactions the processor asks us to approve or reject.
async fn authorizations(
    State(state): State<AppState>,
    request: SignedRequest,
) -> Result<SignedResponse, ServerError> {
    let decision = state.processor.authorize(&request);

    // Sign the exact bytes that go on the wire.
    let body = serde_json::to_vec(&decision)?;
    SignedResponse::sign(&state.signer, &request, Body::from(body))
}

/// Forced adjustments the processor tells us about. The answer has no body
/// and is signed as such.
async fn adjustments(
    State(state): State<AppState>,
    request: SignedRequest,
) -> Result<SignedResponse, ServerError> {
    state.processor.adjust(&request);
    SignedResponse::sign(&state.signer, &request, Body::Absent)
}
