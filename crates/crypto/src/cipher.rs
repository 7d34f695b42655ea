//! Payload cipher capability shared by the AEAD and legacy codecs

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Malformed ciphertext ({0} bytes)")]
    MalformedCiphertext(usize),

    #[error("Authentication failed")]
    Authentication,

    #[error("Invalid padding")]
    Padding,
}

/// Encrypt/decrypt an opaque payload under an already derived key
///
/// Implementations never return partial plaintext on failure.
pub trait PayloadCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError>;
}
