//! Wire Compatibility Tests
//!
//! Known-answer frames for every tag in circulation, including a frame
//! recorded from a deployed legacy sender.

mod harness;

use harness::{blob_bytes, field_protocol, field_secret, legacy_frame, with_blob};
use sealsms_protocol::{
    CsvReport, DecodeError, EndedAt, FrameError, FrameVersion, ReceiveError, decode, parse,
};
use std::collections::HashSet;

const V1_FRAME: &str = "DS:paWlpaWlpaWlpaWlSi16sOTRD9NSjwhuDkXNH1vvgia5AKEfxTx/daA9T5Q9s/t/mwZExtnXzPYPjYg=";

const V2_FRAME: &str = "DreamStart:UG-456-789:MEET-001:AAECAwQFBgcICQoLgxRjYCE6TfPLJSlfP7bNcqaC81gAW/2W9+qNTfvCE4SPZZu5ZcqntTgHyxAk4Jw1StKSd5dIR4g6ts5bDw==";

const V3_FRAME: &str =
    "dreamstart:MA-234-567:MEET-001:OYUVgqXd3M3KL8fVnAXBR1Z56naakhXKS6Jl/f7fsJ4u+Onqu3a0T9QWGYE1V7GL";

/// Recorded from a deployed sender before meeting ids were added
const V3_SHORT_FRAME: &str =
    "dreamstart:LK-123-456:W/+dPj73PgL1kxCbEQLg3NZNkp2oN4nwG+GaLpNeHLk1Ml0yxxXiMXe4stZ5oidL";

#[test]
fn test_v1_known_frame() {
    let message = field_protocol().receive(V1_FRAME).unwrap();

    assert_eq!(message.version(), FrameVersion::V1);
    assert_eq!(message.context_id(), None);

    let report = CsvReport::parse(&message.plaintext).unwrap();
    assert_eq!(report.group_id, "GROUP1");
    assert_eq!(report.meeting_id, "MEET-001");
    assert_eq!(report.dotted_version(), "2.17.0");
    assert_eq!(report.timestamp, 1_764_134_855);
}

#[test]
fn test_v2_known_frame() {
    let message = field_protocol().receive(V2_FRAME).unwrap();

    assert_eq!(message.version(), FrameVersion::V2);
    assert_eq!(message.context_id(), Some("UG-456-789"));
    assert_eq!(message.meeting(), Some("MEET-001"));
    assert_eq!(
        message.plaintext,
        "Meeting ended for group UG-456-789 at 12:33PM"
    );
}

#[test]
fn test_v3_known_frame() {
    let message = field_protocol().receive(V3_FRAME).unwrap();

    assert_eq!(message.version(), FrameVersion::V3);
    assert_eq!(message.meeting(), Some("MEET-001"));

    let payload = EndedAt::parse(&message.plaintext).unwrap();
    assert_eq!(payload.ended_at, "2025-11-14T12:33:00Z");
}

#[test]
fn test_v3_recorded_short_frame() {
    let message = field_protocol().receive(V3_SHORT_FRAME).unwrap();

    assert_eq!(message.context_id(), Some("LK-123-456"));
    assert_eq!(message.meeting(), None);
    assert_eq!(
        message.plaintext,
        "Meeting ended for group LK-123-456 at 10:00AM"
    );
}

#[test]
fn test_legacy_fixture_matches_recorded_frame() {
    let rebuilt = legacy_frame(
        &field_secret(),
        "LK-123-456",
        None,
        "Meeting ended for group LK-123-456 at 10:00AM",
    );
    assert_eq!(rebuilt, V3_SHORT_FRAME);
}

#[test]
fn test_concrete_vector_round_trip() {
    let protocol = field_protocol();
    let plaintext = "Meeting ended for group UG-456-789 at 12:33PM";

    let raw = protocol.send("UG-456-789", "MEET-001", plaintext).unwrap();
    assert_eq!(decode(&raw, &field_secret()).unwrap(), plaintext);

    let wrong_group = raw.replacen("UG-456-789", "UG-456-790", 1);
    assert!(matches!(
        decode(&wrong_group, &field_secret()),
        Err(DecodeError::DecryptionFailed)
    ));
    assert!(matches!(
        protocol.receive(&wrong_group),
        Err(ReceiveError::Decode(DecodeError::DecryptionFailed))
    ));
}

#[test]
fn test_every_blob_byte_is_authenticated() {
    let blob = blob_bytes(V2_FRAME);

    for i in 0..blob.len() {
        let mut tampered = blob.clone();
        tampered[i] ^= 0x80;
        let raw = with_blob(V2_FRAME, &tampered);

        assert!(
            matches!(
                decode(&raw, &field_secret()),
                Err(DecodeError::DecryptionFailed)
            ),
            "flip at byte {} was accepted",
            i
        );
    }
}

#[test]
fn test_truncated_blob() {
    let blob = blob_bytes(V2_FRAME);
    let raw = with_blob(V2_FRAME, &blob[..27]);

    assert!(matches!(
        decode(&raw, &field_secret()),
        Err(DecodeError::MalformedCiphertext)
    ));
}

#[test]
fn test_tags_are_not_interchangeable() {
    // Same blob, different tag: the key or codec changes and decoding fails
    let as_v1 = format!("DS:{}", parse(V2_FRAME).unwrap().blob());
    assert!(decode(&as_v1, &field_secret()).is_err());

    let as_v3 = V2_FRAME.replacen("DreamStart", "dreamstart", 1);
    let result = decode(&as_v3, &field_secret());
    assert!(result.is_err());

    let lowercase_v1 = V1_FRAME.replacen("DS", "ds", 1);
    assert!(matches!(
        field_protocol().receive(&lowercase_v1),
        Err(ReceiveError::UnsupportedProtocol(_))
    ));
}

#[test]
fn test_unknown_tag() {
    assert!(matches!(parse("bogus:abc"), Err(FrameError::UnknownTag(_))));
    assert!(matches!(
        field_protocol().receive("bogus:abc"),
        Err(ReceiveError::UnsupportedProtocol(_))
    ));
}

#[test]
fn test_legacy_wrong_secret_never_yields_plaintext() {
    let other = sealsms_crypto::SharedSecret::new("not-the-field-secret");

    match decode(V3_SHORT_FRAME, &other) {
        Ok(plaintext) => assert_ne!(
            plaintext,
            "Meeting ended for group LK-123-456 at 10:00AM"
        ),
        Err(err) => assert_eq!(err.reason(), "decryption failed"),
    }
}

#[test]
fn test_legacy_frames_repeat_aead_frames_do_not() {
    let secret = field_secret();
    let a = legacy_frame(&secret, "G1", Some("M1"), "same payload");
    let b = legacy_frame(&secret, "G1", Some("M1"), "same payload");
    assert_eq!(a, b);

    let protocol = field_protocol();
    let frames: HashSet<String> = (0..1000)
        .map(|_| protocol.send("G1", "M1", "same payload").unwrap())
        .collect();
    assert_eq!(frames.len(), 1000);
}

#[test]
fn test_sms_line_endings_are_tolerated() {
    let raw = format!("{}\r\n", V2_FRAME);
    assert!(field_protocol().receive(&raw).is_ok());
}
