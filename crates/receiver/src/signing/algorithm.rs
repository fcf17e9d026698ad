use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::canonical::CanonicalMessage;
use super::keys::Secret;
use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// MAC algorithms accepted in the `X-Signature` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    HmacSha256,
}

impl SignatureAlgorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }

    /// Compute the raw MAC over the canonical message.
    pub fn compute(&self, secret: &Secret, message: &CanonicalMessage<'_>) -> Vec<u8> {
        match self {
            SignatureAlgorithm::HmacSha256 => {
                let mut mac = hmac_sha256(secret);
                message.feed(&mut mac);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    /// Check `tag` against the MAC of `message`.
    ///
    /// The comparison runs in constant time with respect to the contents
    /// of `tag`; a tag of the wrong length is simply unequal.
    pub fn verify(&self, secret: &Secret, message: &CanonicalMessage<'_>, tag: &[u8]) -> bool {
        match self {
            SignatureAlgorithm::HmacSha256 => {
                let mut mac = hmac_sha256(secret);
                message.feed(&mut mac);
                mac.verify_slice(tag).is_ok()
            }
        }
    }
}

fn hmac_sha256(secret: &Secret) -> HmacSha256 {
    // HMAC pads or hashes any key length, so this cannot fail.
    <HmacSha256 as Mac>::new_from_slice(secret.expose())
        .expect("HMAC-SHA256 accepts keys of any length")
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac-sha256" => Ok(SignatureAlgorithm::HmacSha256),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Value of the combined `X-Signature` header: `"<algorithm> <base64>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    algorithm: SignatureAlgorithm,
    value: String,
}

impl SignatureHeader {
    pub fn new(algorithm: SignatureAlgorithm, value: String) -> Self {
        Self { algorithm, value }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Base64 encoded MAC, as it appears on the wire.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm, self.value)
    }
}

impl FromStr for SignatureHeader {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, value) = s
            .split_once(' ')
            .ok_or_else(|| SignatureError::UnsupportedAlgorithm(s.to_string()))?;
        let algorithm = algorithm.parse()?;
        Ok(Self {
            algorithm,
            value: value.to_string(),
        })
    }
}
