//! Limiter key derivation.

use sha2::{Digest, Sha256};

use crate::error::{Result, WindgateError};

/// A key that uniquely identifies one (client, resource) pair in the store.
///
/// The key is a hex-encoded SHA-256 digest: deterministic within a process
/// and across processes, collision-resistant, and not reversible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the limiter key for a client identity and resource identity.
///
/// The client identity should be the most specific trustworthy network
/// identity the caller has; whether forwarded-address headers are honored is
/// the caller's trust-boundary decision, not made here.
pub fn derive_key(client_identity: &str, resource_identity: &str) -> Result<RateLimitKey> {
    if client_identity.is_empty() {
        return Err(WindgateError::InvalidKeyInput(
            "Client identity cannot be empty".to_string(),
        ));
    }
    if resource_identity.is_empty() {
        return Err(WindgateError::InvalidKeyInput(
            "Resource identity cannot be empty".to_string(),
        ));
    }

    let mut hasher = Sha256::new();
    hasher.update(client_identity.as_bytes());
    hasher.update(b":");
    hasher.update(resource_identity.as_bytes());
    Ok(RateLimitKey(format!("{:x}", hasher.finalize())))
}
