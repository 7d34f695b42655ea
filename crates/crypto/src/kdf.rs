//! HMAC-SHA256 key derivation
//!
//! A per-context key is `HMAC-SHA256(secret, context)`. The context is public
//! (a group number), so no constant-time handling of it is needed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Length of a derived key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Context used by the oldest frame version, which has a single global key
pub const GLOBAL_CONTEXT: &str = "";

#[derive(Error, Debug)]
pub enum KdfError {
    #[error("Key derivation unavailable: {0}")]
    Unavailable(String),
}

/// Long-term secret shared by senders and receivers
///
/// Never logged and never placed in a frame. The `version` only tags the
/// secret for key caching; it changes whenever the secret bytes change.
#[derive(Clone)]
pub struct SharedSecret {
    bytes: Vec<u8>,
    version: u32,
}

impl SharedSecret {
    /// Create a secret with version 1
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_version(bytes, 1)
    }

    pub fn with_version(bytes: impl Into<Vec<u8>>, version: u32) -> Self {
        Self {
            bytes: bytes.into(),
            version,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("bytes", &"<redacted>")
            .field("version", &self.version)
            .finish()
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// 256-bit symmetric key derived from a shared secret and a context
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Derive the key for `context`: `HMAC-SHA256(secret, utf8(context))`
///
/// Deterministic; identical inputs always give the identical key, which is
/// what lets the receiver decrypt independently. `context` may be empty.
pub fn derive_key(secret: &SharedSecret, context: &str) -> Result<DerivedKey, KdfError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose())
        .map_err(|e| KdfError::Unavailable(e.to_string()))?;
    mac.update(context.as_bytes());
    Ok(DerivedKey(mac.finalize().into_bytes().into()))
}

/// Derive the single global key of the oldest frame version
pub fn derive_global_key(secret: &SharedSecret) -> Result<DerivedKey, KdfError> {
    derive_key(secret, GLOBAL_CONTEXT)
}
