//! sealsms crypto - key derivation and payload ciphers
//!
//! This crate provides:
//! - HMAC-SHA256 derivation of per-context keys from a shared secret
//! - AES-256-GCM payload codec (`nonce || ciphertext || tag`)
//! - Legacy AES-256-ECB codec, kept for decoding old frames
//! - A key cache keyed by secret version and context

mod aead;
mod cipher;
mod kdf;
mod key_cache;
mod legacy;

pub use aead::*;
pub use cipher::*;
pub use kdf::*;
pub use key_cache::*;
pub use legacy::*;
