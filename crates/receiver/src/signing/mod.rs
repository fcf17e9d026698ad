mod algorithm;
mod canonical;
mod keys;
mod signer;
mod verifier;

pub use algorithm::{SignatureAlgorithm, SignatureHeader};
pub use canonical::{Body, CanonicalMessage};
pub use keys::{KeyResolver, Secret, StaticKeyRegistry};
pub use signer::{SignatureHeaders, Signer};
pub use verifier::{SignedRequest, Verifier};

pub const X_ENDPOINT: &str = "x-endpoint";
pub const X_TIMESTAMP: &str = "x-timestamp";
pub const X_SIGNATURE: &str = "x-signature";
pub const X_API_KEY: &str = "x-api-key";
