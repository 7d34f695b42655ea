//! SMS frame grammars
//!
//! Every frame is `:`-joined ASCII whose last field is the standard base64 of
//! the cipher blob. Three versions are in circulation, told apart by their
//! case-sensitive tag:
//!
//! | Version | Grammar                                   | Codec       |
//! |---------|-------------------------------------------|-------------|
//! | V1      | `DS:<blob>`                               | AES-256-GCM |
//! | V2      | `DreamStart:<context>:<meeting>:<blob>`   | AES-256-GCM |
//! | V3      | `dreamstart:<context>[:<meeting>]:<blob>` | AES-256-ECB |
//!
//! V1 uses the global key; V2 and V3 derive the key from the context id.
//! V3 frames are only ever decoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sealsms_crypto::{
    AeadCodec, CipherError, DerivedKey, GLOBAL_CONTEXT, KdfError, LegacyCodec, PayloadCipher,
    SharedSecret, derive_global_key, derive_key,
};
use std::fmt;
use thiserror::Error;

/// Field separator
pub const SEPARATOR: char = ':';

/// Frame errors raised while building or parsing
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Unknown frame tag: {0:?}")]
    UnknownTag(String),

    #[error("Malformed {version} frame: {reason}")]
    Malformed {
        version: FrameVersion,
        reason: &'static str,
    },

    #[error("Invalid {field} for {version} frame")]
    InvalidField {
        version: FrameVersion,
        field: &'static str,
    },

    #[error("{version} frames carry {expected} metadata field(s), got {actual}")]
    MetadataCount {
        version: FrameVersion,
        expected: usize,
        actual: usize,
    },

    #[error("{0} frames are decode-only")]
    LegacyEncodeRefused(FrameVersion),

    #[error(transparent)]
    KeyDerivation(#[from] KdfError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Errors raised while decoding a frame into plaintext
///
/// Authentication and padding failures share one variant so a receiver never
/// reveals which check rejected a blob.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Malformed ciphertext")]
    MalformedCiphertext,

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error(transparent)]
    KeyDerivation(#[from] KdfError),
}

impl From<CipherError> for DecodeError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::MalformedCiphertext(_) => DecodeError::MalformedCiphertext,
            CipherError::Authentication | CipherError::Padding | CipherError::EncryptionFailed => {
                DecodeError::DecryptionFailed
            }
        }
    }
}

impl DecodeError {
    /// Stable short reason, suitable for a failed-decrypt log
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::Frame(FrameError::UnknownTag(_)) => "unknown tag",
            DecodeError::Frame(_) => "malformed frame",
            DecodeError::MalformedCiphertext => "malformed ciphertext",
            DecodeError::DecryptionFailed => "decryption failed",
            DecodeError::KeyDerivation(_) => "key derivation unavailable",
        }
    }
}

/// Frame grammar version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameVersion {
    /// `DS:<blob>`, AEAD under the global key
    V1,
    /// `DreamStart:<context>:<meeting>:<blob>`, AEAD under the context key
    V2,
    /// `dreamstart:<context>[:<meeting>]:<blob>`, legacy ECB, decode-only
    V3,
}

impl FrameVersion {
    /// Version used for every outgoing frame
    pub const CURRENT: FrameVersion = FrameVersion::V2;

    pub const ALL: [FrameVersion; 3] = [FrameVersion::V1, FrameVersion::V2, FrameVersion::V3];

    pub fn tag(self) -> &'static str {
        match self {
            FrameVersion::V1 => "DS",
            FrameVersion::V2 => "DreamStart",
            FrameVersion::V3 => "dreamstart",
        }
    }

    /// Exact, case-sensitive tag lookup
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    /// Whether the blob carries an integrity tag
    pub fn is_authenticated(self) -> bool {
        !matches!(self, FrameVersion::V3)
    }

    /// Metadata fields between the context id and the blob in the full grammar
    ///
    /// V3's short form omits its one metadata field.
    pub fn metadata_fields(self) -> usize {
        match self {
            FrameVersion::V1 => 0,
            FrameVersion::V2 | FrameVersion::V3 => 1,
        }
    }

    /// Fields after the tag, blob included, in the full grammar
    fn wire_fields(self) -> usize {
        match self {
            FrameVersion::V1 => 1,
            FrameVersion::V2 | FrameVersion::V3 => self.metadata_fields() + 2,
        }
    }
}

impl fmt::Display for FrameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameVersion::V1 => "V1",
            FrameVersion::V2 => "V2",
            FrameVersion::V3 => "V3",
        };
        write!(f, "{} ({})", name, self.tag())
    }
}

/// A parsed frame, one variant per tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Ds {
        blob: String,
    },
    DreamStart {
        context_id: String,
        meeting: String,
        blob: String,
    },
    /// The earliest senders omitted the meeting field
    LegacyDreamstart {
        context_id: String,
        meeting: Option<String>,
        blob: String,
    },
}

impl Frame {
    pub fn version(&self) -> FrameVersion {
        match self {
            Frame::Ds { .. } => FrameVersion::V1,
            Frame::DreamStart { .. } => FrameVersion::V2,
            Frame::LegacyDreamstart { .. } => FrameVersion::V3,
        }
    }

    pub fn context_id(&self) -> Option<&str> {
        match self {
            Frame::Ds { .. } => None,
            Frame::DreamStart { context_id, .. } | Frame::LegacyDreamstart { context_id, .. } => {
                Some(context_id.as_str())
            }
        }
    }

    /// Metadata fields in wire order
    pub fn metadata(&self) -> Vec<&str> {
        match self {
            Frame::Ds { .. } => Vec::new(),
            Frame::DreamStart { meeting, .. } => vec![meeting.as_str()],
            Frame::LegacyDreamstart { meeting, .. } => meeting.iter().map(String::as_str).collect(),
        }
    }

    /// Base64 blob, not yet decoded
    pub fn blob(&self) -> &str {
        match self {
            Frame::Ds { blob }
            | Frame::DreamStart { blob, .. }
            | Frame::LegacyDreamstart { blob, .. } => blob.as_str(),
        }
    }

    /// Context the key is derived from
    pub fn key_context(&self) -> &str {
        self.context_id().unwrap_or(GLOBAL_CONTEXT)
    }

    /// Decrypt the blob under an already derived key
    pub fn open(&self, key: &DerivedKey) -> Result<String, DecodeError> {
        let blob = STANDARD
            .decode(self.blob())
            .map_err(|_| DecodeError::MalformedCiphertext)?;

        let plaintext = decode_cipher(self.version(), key).decrypt(&blob)?;

        String::from_utf8(plaintext).map_err(|_| DecodeError::DecryptionFailed)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.version().tag())?;
        if let Some(context_id) = self.context_id() {
            write!(f, "{}{}", SEPARATOR, context_id)?;
        }
        for field in self.metadata() {
            write!(f, "{}{}", SEPARATOR, field)?;
        }
        write!(f, "{}{}", SEPARATOR, self.blob())
    }
}

/// Cipher used to open a frame of `version`
fn decode_cipher(version: FrameVersion, key: &DerivedKey) -> Box<dyn PayloadCipher> {
    match version {
        FrameVersion::V1 | FrameVersion::V2 => Box::new(AeadCodec::new(key)),
        FrameVersion::V3 => Box::new(LegacyCodec::new(key)),
    }
}

fn check_field(value: &str) -> bool {
    !value.contains(SEPARATOR)
}

/// Validate the plaintext fields of an outgoing frame
fn check_fields(
    version: FrameVersion,
    context_id: &str,
    metadata: &[&str],
) -> Result<(), FrameError> {
    match version {
        FrameVersion::V1 if !context_id.is_empty() => {
            // V1 frames have no context field; the key is global
            return Err(FrameError::InvalidField {
                version,
                field: "context id",
            });
        }
        FrameVersion::V1 => {}
        FrameVersion::V3 => return Err(FrameError::LegacyEncodeRefused(version)),
        FrameVersion::V2 => {
            if context_id.is_empty() || !check_field(context_id) {
                return Err(FrameError::InvalidField {
                    version,
                    field: "context id",
                });
            }
        }
    }

    if metadata.len() != version.metadata_fields() {
        return Err(FrameError::MetadataCount {
            version,
            expected: version.metadata_fields(),
            actual: metadata.len(),
        });
    }

    if !metadata.iter().all(|field| check_field(field)) {
        return Err(FrameError::InvalidField {
            version,
            field: "metadata",
        });
    }

    Ok(())
}

/// Encrypt and frame `plaintext` under an already derived key
///
/// Only AEAD versions can be sealed; the legacy codec is never reachable here.
pub(crate) fn seal_with_key(
    version: FrameVersion,
    context_id: &str,
    metadata: &[&str],
    key: &DerivedKey,
    plaintext: &[u8],
) -> Result<Frame, FrameError> {
    check_fields(version, context_id, metadata)?;

    let blob = STANDARD.encode(AeadCodec::new(key).encrypt(plaintext)?);

    Ok(match version {
        FrameVersion::V1 => Frame::Ds { blob },
        _ => Frame::DreamStart {
            context_id: context_id.to_owned(),
            meeting: metadata[0].to_owned(),
            blob,
        },
    })
}

/// Build a frame string for `version`
///
/// The key is derived per the version's rule; V1 requires an empty
/// `context_id`. V3 is refused.
pub fn build(
    version: FrameVersion,
    context_id: &str,
    metadata: &[&str],
    plaintext: &[u8],
    secret: &SharedSecret,
) -> Result<String, FrameError> {
    let key = match version {
        FrameVersion::V1 => derive_global_key(secret)?,
        _ => derive_key(secret, context_id)?,
    };
    seal_with_key(version, context_id, metadata, &key, plaintext).map(|frame| frame.to_string())
}

/// Split a received string into its frame variant
///
/// Surrounding ASCII whitespace is ignored. The tag runs up to the first `:`; the
/// remainder is split at most `fields + 1` times so the blob is always the
/// whole last field.
pub fn parse(raw: &str) -> Result<Frame, FrameError> {
    let raw = raw.trim_matches(|c: char| c.is_ascii_whitespace());

    let (tag, rest) = match raw.split_once(SEPARATOR) {
        Some((tag, rest)) => (tag, Some(rest)),
        None => (raw, None),
    };

    let version =
        FrameVersion::from_tag(tag).ok_or_else(|| FrameError::UnknownTag(tag.to_owned()))?;

    let malformed = |reason| FrameError::Malformed { version, reason };

    let rest = rest.ok_or_else(|| malformed("missing payload"))?;
    let fields: Vec<&str> = rest.splitn(version.wire_fields(), SEPARATOR).collect();

    let frame = match (version, fields.as_slice()) {
        (FrameVersion::V1, [blob]) => Frame::Ds {
            blob: (*blob).to_owned(),
        },
        (FrameVersion::V2, [context_id, meeting, blob]) => Frame::DreamStart {
            context_id: (*context_id).to_owned(),
            meeting: (*meeting).to_owned(),
            blob: (*blob).to_owned(),
        },
        (FrameVersion::V3, [context_id, meeting, blob]) => Frame::LegacyDreamstart {
            context_id: (*context_id).to_owned(),
            meeting: Some((*meeting).to_owned()),
            blob: (*blob).to_owned(),
        },
        (FrameVersion::V3, [context_id, blob]) => Frame::LegacyDreamstart {
            context_id: (*context_id).to_owned(),
            meeting: None,
            blob: (*blob).to_owned(),
        },
        _ => return Err(malformed("wrong field count")),
    };

    if frame.context_id().is_some_and(str::is_empty) {
        return Err(malformed("empty context id"));
    }
    if frame.blob().is_empty() {
        return Err(malformed("empty payload"));
    }

    Ok(frame)
}

/// Parse, derive the key for the detected version, and decrypt
pub fn decode(raw: &str, secret: &SharedSecret) -> Result<String, DecodeError> {
    let frame = parse(raw)?;
    let key = derive_key(secret, frame.key_context())?;
    frame.open(&key)
}
