use serde::{Deserialize, Serialize};
use tracing::info;

use crate::signing::SignedRequest;

/// Body of an authorization answer. Empty fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl AuthorizationResponse {
    pub fn approved() -> Self {
        Self {
            status: "APPROVED".to_string(),
            status_detail: "APPROVED".to_string(),
            message: "Ok".to_string(),
        }
    }
}

/// Business logic behind the two webhook routes.
///
/// Only ever called with requests whose signature has been verified.
pub trait TransactionProcessor: Send + Sync {
    /// Decide on a card transaction the processor is asking to authorize.
    fn authorize(&self, request: &SignedRequest) -> AuthorizationResponse;

    /// Record a forced adjustment. Adjustments cannot be rejected.
    fn adjust(&self, request: &SignedRequest);
}

/// Approves every authorization and acknowledges every adjustment.
pub struct ApproveAll;

impl TransactionProcessor for ApproveAll {
    fn authorize(&self, request: &SignedRequest) -> AuthorizationResponse {
        info!(endpoint = ?request.endpoint, "Authorization processed");
        AuthorizationResponse::approved()
    }

    fn adjust(&self, request: &SignedRequest) {
        info!(endpoint = ?request.endpoint, "Adjustment processed");
    }
}
