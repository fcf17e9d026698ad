use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw shared secret bytes for one API key.
///
/// Never empty. The bytes are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap raw key bytes. Returns `None` for an empty key.
    pub fn new(bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    pub fn from_base64(encoded: &str) -> Option<Self> {
        STANDARD.decode(encoded).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Looks up the shared secret behind a public API key identifier.
///
/// Implementations are read-only after construction and shared across
/// requests.
pub trait KeyResolver: Send + Sync {
    /// `None` when the identifier is unknown.
    fn resolve(&self, api_key_id: &str) -> Option<Secret>;
}

/// Immutable registry of base64 encoded secrets, decoded on lookup.
#[derive(Clone, Default)]
pub struct StaticKeyRegistry {
    secrets: HashMap<String, String>,
}

impl StaticKeyRegistry {
    /// Build a registry from `api key id -> base64 secret` pairs.
    ///
    /// Every secret must decode to a non-empty key.
    pub fn from_encoded<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut secrets = HashMap::new();
        for (api_key_id, encoded) in entries {
            if api_key_id.is_empty() {
                bail!("api key identifier must not be empty");
            }
            if Secret::from_base64(&encoded).is_none() {
                bail!("secret for api key {api_key_id} is not non-empty base64");
            }
            secrets.insert(api_key_id, encoded);
        }
        Ok(Self { secrets })
    }

    /// Load a JSON object of `api key id -> base64 secret` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("reading key file {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing key file {}", path.display()))?;
        Self::from_encoded(entries)
    }

    /// Merge another registry in; its entries win on conflict.
    pub fn merge(mut self, other: StaticKeyRegistry) -> Self {
        self.secrets.extend(other.secrets);
        self
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl KeyResolver for StaticKeyRegistry {
    fn resolve(&self, api_key_id: &str) -> Option<Secret> {
        let encoded = self.secrets.get(api_key_id)?;
        let secret = Secret::from_base64(encoded);
        if secret.is_none() {
            warn!(api_key_id, "registered secret failed to decode");
        }
        secret
    }
}

impl fmt::Debug for StaticKeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeyRegistry")
            .field("api_key_ids", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}
