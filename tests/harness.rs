//! Shared fixtures for the integration tests
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sealsms_crypto::{LegacyCodec, PayloadCipher, SharedSecret, derive_key};
use sealsms_protocol::Protocol;
use std::sync::Arc;

/// Secret used by the recorded field frames
pub const FIELD_SECRET: &str = "4pR$Z9!nV@u2#tC7^hL6%yK1*fM3&eX5";

pub fn field_secret() -> SharedSecret {
    SharedSecret::new(FIELD_SECRET)
}

pub fn field_protocol() -> Protocol {
    Protocol::new(Arc::new(field_secret()))
}

/// Produce a legacy `dreamstart` frame the way the old senders did
///
/// The protocol crate refuses to build these, so fixtures go through the codec.
pub fn legacy_frame(
    secret: &SharedSecret,
    context_id: &str,
    meeting: Option<&str>,
    plaintext: &str,
) -> String {
    let key = derive_key(secret, context_id).unwrap();
    let blob = LegacyCodec::new(&key).encrypt(plaintext.as_bytes()).unwrap();
    let blob = STANDARD.encode(blob);

    match meeting {
        Some(meeting) => format!("dreamstart:{}:{}:{}", context_id, meeting, blob),
        None => format!("dreamstart:{}:{}", context_id, blob),
    }
}

/// Decode a frame's base64 blob
pub fn blob_bytes(frame: &str) -> Vec<u8> {
    let blob = frame.rsplit(':').next().unwrap();
    STANDARD.decode(blob).unwrap()
}

/// Replace a frame's blob with `bytes`
pub fn with_blob(frame: &str, bytes: &[u8]) -> String {
    let (head, _) = frame.rsplit_once(':').unwrap();
    format!("{}:{}", head, STANDARD.encode(bytes))
}
