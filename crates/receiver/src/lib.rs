pub mod error;
pub mod logging;
pub mod server;
pub mod signing;
pub mod transactions;

pub use error::{ServerError, SignatureError};
pub use server::{AppState, SignedResponse, router, run};
pub use signing::{Body, KeyResolver, SignedRequest, Signer, StaticKeyRegistry, Verifier};
pub use transactions::{ApproveAll, AuthorizationResponse, TransactionProcessor};
