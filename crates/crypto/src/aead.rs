//! AES-256-GCM payload codec
//!
//! Blob layout: `nonce (12) || ciphertext || tag (16)`. No associated data is
//! bound, so frame fields carried next to the blob are not authenticated.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::cipher::{CipherError, PayloadCipher};
use crate::kdf::DerivedKey;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Smallest valid blob: a nonce and a tag around an empty ciphertext
pub const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

/// AES-256-GCM cipher with a fresh random nonce per message
pub struct AeadCodec {
    cipher: Aes256Gcm,
}

impl AeadCodec {
    pub fn new(key: &DerivedKey) -> Self {
        let cipher = Aes256Gcm::new(key.as_bytes().into());
        Self { cipher }
    }
}

impl PayloadCipher for AeadCodec {
    /// Returns `nonce || ciphertext || tag`
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&sealed);

        Ok(blob)
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(CipherError::MalformedCiphertext(blob.len()));
        }

        // The aead API expects ciphertext || tag, which is everything after the nonce
        let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, sealed)
            .map_err(|_| CipherError::Authentication)
    }
}
