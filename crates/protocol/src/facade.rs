//! Send/receive facade
//!
//! Senders always emit `FrameVersion::CURRENT`. Receivers read the version
//! from the tag and decode with that version's rules.

use sealsms_crypto::{
    DEFAULT_KEY_CACHE_CAPACITY, DerivedKey, KdfError, KeyCache, SharedSecret, derive_key,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::frame::{DecodeError, Frame, FrameError, FrameVersion, parse, seal_with_key};

#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("Unsupported protocol tag: {0:?}")]
    UnsupportedProtocol(String),

    #[error(transparent)]
    Decode(DecodeError),
}

impl From<DecodeError> for ReceiveError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Frame(FrameError::UnknownTag(tag)) => ReceiveError::UnsupportedProtocol(tag),
            other => ReceiveError::Decode(other),
        }
    }
}

impl ReceiveError {
    /// Stable short reason, suitable for a failed-decrypt log
    pub fn reason(&self) -> &'static str {
        match self {
            ReceiveError::UnsupportedProtocol(_) => "unsupported protocol",
            ReceiveError::Decode(err) => err.reason(),
        }
    }
}

/// A decoded frame and its plaintext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub frame: Frame,
    pub plaintext: String,
}

impl ReceivedMessage {
    pub fn version(&self) -> FrameVersion {
        self.frame.version()
    }

    pub fn context_id(&self) -> Option<&str> {
        self.frame.context_id()
    }

    /// First metadata field (the meeting identifier), when present
    pub fn meeting(&self) -> Option<&str> {
        self.frame.metadata().first().copied()
    }
}

/// Protocol endpoint holding the shared secret
///
/// Stateless apart from the optional key cache; safe to share across threads.
pub struct Protocol {
    secret: Arc<SharedSecret>,
    key_cache: Option<KeyCache>,
}

impl Protocol {
    pub fn new(secret: Arc<SharedSecret>) -> Self {
        Self {
            secret,
            key_cache: None,
        }
    }

    /// Memoise derived keys per `(secret version, context)`
    pub fn with_key_cache(self) -> Self {
        self.with_key_cache_capacity(DEFAULT_KEY_CACHE_CAPACITY)
    }

    pub fn with_key_cache_capacity(mut self, capacity: usize) -> Self {
        self.key_cache = Some(KeyCache::with_capacity(capacity));
        self
    }

    pub fn clear_key_cache(&self) {
        if let Some(cache) = &self.key_cache {
            cache.clear();
        }
    }

    /// Number of cached keys (0 when caching is off)
    pub fn cached_keys(&self) -> usize {
        self.key_cache.as_ref().map_or(0, KeyCache::len)
    }

    /// Key for `context`, and whether it still has to be cached
    fn key_for(&self, context: &str) -> Result<(DerivedKey, bool), KdfError> {
        if let Some(key) = self.key_cache.as_ref().and_then(|c| c.get(&self.secret, context)) {
            return Ok((key, false));
        }
        Ok((derive_key(&self.secret, context)?, self.key_cache.is_some()))
    }

    /// Cache a key only once a frame has been sealed or opened with it
    fn remember(&self, context: &str, key: DerivedKey) {
        if let Some(cache) = &self.key_cache {
            if !cache.insert(&self.secret, context, key) {
                debug!(capacity = cache.capacity(), "Key cache full");
            }
        }
    }

    /// Seal `plaintext` into a frame of the current version
    pub fn send(
        &self,
        context_id: &str,
        meeting: &str,
        plaintext: &str,
    ) -> Result<String, FrameError> {
        let version = FrameVersion::CURRENT;
        let (key, miss) = self.key_for(context_id)?;
        let frame = seal_with_key(version, context_id, &[meeting], &key, plaintext.as_bytes())?;
        if miss {
            self.remember(context_id, key);
        }

        debug!(%version, context_id, "Sealed frame");
        Ok(frame.to_string())
    }

    /// Parse `raw` once, then decode it with the rules of its tag
    pub fn receive(&self, raw: &str) -> Result<ReceivedMessage, ReceiveError> {
        let result = parse(raw)
            .map_err(DecodeError::from)
            .and_then(|frame| {
                let (key, miss) = self.key_for(frame.key_context())?;
                let plaintext = frame.open(&key)?;
                if miss {
                    self.remember(frame.key_context(), key);
                }
                Ok(ReceivedMessage { frame, plaintext })
            })
            .map_err(ReceiveError::from);

        match &result {
            Ok(message) => {
                let version = message.version();
                if !version.is_authenticated() {
                    warn!(%version, "Accepted unauthenticated legacy frame");
                }
                debug!(%version, context_id = message.context_id(), "Opened frame");
            }
            Err(err) => warn!(reason = err.reason(), "Rejected frame"),
        }

        result
    }
}
