//! sealsms protocol - SMS frame formats and the send/receive facade
//!
//! This crate defines:
//! - `FrameVersion`/`Frame`: the three `:`-delimited grammars (`DS`, `DreamStart`, `dreamstart`)
//! - `build`/`parse`/`decode`: frame construction and decoding
//! - `Protocol`: sends with the current version, receives any known version
//! - Payload records for the CSV and JSON plaintexts in circulation
//!
//! Frame fields other than the blob are not bound into the ciphertext, and
//! nothing here detects replays; receivers that need either must add it.

mod facade;
mod frame;
mod payload;

pub use facade::*;
pub use frame::*;
pub use payload::*;
