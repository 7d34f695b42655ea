//! Application payloads carried inside frames
//!
//! The codecs treat plaintext as opaque; these records are the shapes the
//! deployed senders actually put there.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Expected {expected} comma-separated fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Empty field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Meeting number in payload does not match the frame")]
    MeetingMismatch,
}

/// CSV report sent in `DS` frames: `group,meeting,appVersion,timestampSeconds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReport {
    pub group_id: String,
    pub meeting_id: String,
    /// Kept as sent; older builds did not always send an integer
    pub app_version: String,
    /// Seconds since the epoch, 0 when the field is not a number
    pub timestamp: u64,
}

impl CsvReport {
    const FIELDS: usize = 4;

    pub fn parse(plaintext: &str) -> Result<Self, PayloadError> {
        let parts: Vec<&str> = plaintext.split(',').map(str::trim).collect();
        if parts.len() != Self::FIELDS {
            return Err(PayloadError::FieldCount {
                expected: Self::FIELDS,
                actual: parts.len(),
            });
        }

        let names = ["group_id", "meeting_id", "app_version", "timestamp"];
        for (part, name) in parts.iter().zip(names) {
            if part.is_empty() {
                return Err(PayloadError::EmptyField(name));
            }
        }

        Ok(Self {
            group_id: parts[0].to_owned(),
            meeting_id: parts[1].to_owned(),
            app_version: parts[2].to_owned(),
            timestamp: parts[3].parse().unwrap_or(0),
        })
    }

    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{}",
            self.group_id, self.meeting_id, self.app_version, self.timestamp
        )
    }

    /// App version in dotted form: `217` -> `2.1.7`, `2170` -> `2.17.0`
    pub fn dotted_version(&self) -> String {
        dotted_version(&self.app_version)
    }
}

/// Render an integer app version in dotted notation
///
/// Three digits split evenly; four digits keep the middle pair together.
/// Anything else is returned unchanged.
pub fn dotted_version(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.is_ascii() {
        return raw.to_owned();
    }
    match raw.len() {
        3 => format!("{}.{}.{}", &raw[0..1], &raw[1..2], &raw[2..3]),
        4 => format!("{}.{}.{}", &raw[0..1], &raw[1..3], &raw[3..4]),
        _ => raw.to_owned(),
    }
}

/// JSON meeting report sent in `DreamStart` frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingReport {
    pub meeting_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl MeetingReport {
    pub fn parse(plaintext: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(plaintext)?)
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the encrypted meeting number against the plaintext frame field
    ///
    /// The frame field is not authenticated by the cipher, so a receiver that
    /// trusts it must compare it with the copy inside the ciphertext.
    pub fn verify_meeting_number(&self, frame_meeting: &str) -> Result<(), PayloadError> {
        if self.meeting_number == frame_meeting {
            Ok(())
        } else {
            Err(PayloadError::MeetingMismatch)
        }
    }
}

/// `{"endedAt": "<ISO-8601>"}` payload of legacy `dreamstart` frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndedAt {
    #[serde(rename = "endedAt")]
    pub ended_at: String,
}

impl EndedAt {
    pub fn parse(plaintext: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(plaintext)?)
    }
}
