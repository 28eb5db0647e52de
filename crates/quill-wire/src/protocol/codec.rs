//! Multipart frame codec for the Jupyter messaging wire format.
//!
//! Wire format (one message):
//! ```text
//! [identity…] ["<IDS|MSG>"] [signature] [header] [parent_header] [metadata] [content]
//! ```
//! Zero or more routing identity frames precede the delimiter (the router
//! envelope may carry several); exactly five frames must follow it. The
//! signature frame is a lowercase hex HMAC digest over the four JSON parts
//! in the order they appear on the wire.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::envelope::Header;

/// The literal frame separating routing identities from message content.
pub const DELIMITER: &[u8] = b"<IDS|MSG>";

/// Errors that can occur while decoding an inbound multipart frame.
#[derive(Debug, Error)]
pub enum WireError {
    /// No `<IDS|MSG>` frame was found.
    #[error("missing <IDS|MSG> delimiter in {frames}-frame message")]
    MissingDelimiter { frames: usize },

    /// The delimiter was found but the wrong number of frames followed it.
    #[error("expected 5 frames after delimiter (signature + 4 parts), got {got}")]
    WrongFrameCount { got: usize },

    /// The signature frame contained non-UTF-8 bytes.
    #[error("signature frame is not valid UTF-8")]
    SignatureNotUtf8,

    /// One of the JSON parts failed to parse.
    #[error("malformed {part} JSON: {source}")]
    MalformedPart {
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ── Decoded raw envelope ──────────────────────────────────────────────────────

/// An inbound message split into its fixed-position fields, with the four
/// JSON parts kept as raw bytes.
///
/// Keeping the raw bytes is deliberate: signature verification must MAC the
/// exact bytes that arrived. Re-serializing a parsed value would not be
/// byte-identical in general, so verification would fail closed on honest
/// peers. Header and content are parsed lazily via [`RawEnvelope::parse_header`]
/// and [`RawEnvelope::parse_content`]; parent_header and metadata pass through
/// undecoded to handlers that need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEnvelope {
    /// Routing identity frames, echoed back to address replies.
    pub identities: Vec<Vec<u8>>,
    /// Lowercase hex HMAC digest as received.
    pub signature: String,
    /// Raw `header` JSON bytes.
    pub header: Vec<u8>,
    /// Raw `parent_header` JSON bytes.
    pub parent_header: Vec<u8>,
    /// Raw `metadata` JSON bytes.
    pub metadata: Vec<u8>,
    /// Raw `content` JSON bytes.
    pub content: Vec<u8>,
}

impl RawEnvelope {
    /// The four signed parts in signing order.
    pub fn signed_parts(&self) -> [&[u8]; 4] {
        [&self.header, &self.parent_header, &self.metadata, &self.content]
    }

    /// Parses the header frame as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedPart`] if the frame is not a valid
    /// JSON header.
    pub fn parse_header(&self) -> Result<Header, WireError> {
        serde_json::from_slice(&self.header).map_err(|source| WireError::MalformedPart {
            part: "header",
            source,
        })
    }

    /// Parses the content frame as an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedPart`] if the frame is not valid JSON.
    pub fn parse_content(&self) -> Result<Value, WireError> {
        serde_json::from_slice(&self.content).map_err(|source| WireError::MalformedPart {
            part: "content",
            source,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Splits an inbound multipart message into a [`RawEnvelope`].
///
/// # Errors
///
/// Returns [`WireError::MissingDelimiter`] when no `<IDS|MSG>` frame exists
/// and [`WireError::WrongFrameCount`] when the delimiter is not followed by
/// exactly five frames.
pub fn decode(frames: &[Vec<u8>]) -> Result<RawEnvelope, WireError> {
    let delim_pos = frames
        .iter()
        .position(|f| f.as_slice() == DELIMITER)
        .ok_or(WireError::MissingDelimiter {
            frames: frames.len(),
        })?;

    let after = &frames[delim_pos + 1..];
    if after.len() != 5 {
        return Err(WireError::WrongFrameCount { got: after.len() });
    }

    let signature = String::from_utf8(after[0].clone()).map_err(|_| WireError::SignatureNotUtf8)?;

    Ok(RawEnvelope {
        identities: frames[..delim_pos].to_vec(),
        signature,
        header: after[1].clone(),
        parent_header: after[2].clone(),
        metadata: after[3].clone(),
        content: after[4].clone(),
    })
}

/// Assembles an outbound frame list from a signature and the four serialized
/// parts, in wire order: delimiter, signature, header, parent_header,
/// metadata, content.
pub fn encode(signature: &str, parts: [Vec<u8>; 4]) -> Vec<Vec<u8>> {
    let [header, parent_header, metadata, content] = parts;
    vec![
        DELIMITER.to_vec(),
        signature.as_bytes().to_vec(),
        header,
        parent_header,
        metadata,
        content,
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(identities: usize) -> Vec<Vec<u8>> {
        let mut frames: Vec<Vec<u8>> = (0..identities).map(|i| vec![i as u8]).collect();
        frames.push(DELIMITER.to_vec());
        frames.push(b"cafe".to_vec());
        frames.push(br#"{"msg_id":"1","date":"d","username":"u","session":"s","msg_type":"status"}"#.to_vec());
        frames.push(b"{}".to_vec());
        frames.push(b"{}".to_vec());
        frames.push(br#"{"execution_state":"idle"}"#.to_vec());
        frames
    }

    #[test]
    fn test_decode_single_identity_message() {
        let env = decode(&frames(1)).unwrap();
        assert_eq!(env.identities, vec![vec![0u8]]);
        assert_eq!(env.signature, "cafe");
        assert_eq!(env.parent_header, b"{}");
        let header = env.parse_header().unwrap();
        assert_eq!(header.msg_type, "status");
    }

    #[test]
    fn test_decode_tolerates_multiple_identities() {
        let env = decode(&frames(3)).unwrap();
        assert_eq!(env.identities.len(), 3);
    }

    #[test]
    fn test_decode_tolerates_zero_identities() {
        let env = decode(&frames(0)).unwrap();
        assert!(env.identities.is_empty());
    }

    #[test]
    fn test_decode_missing_delimiter_is_framing_error() {
        let mut msg = frames(1);
        msg.remove(1); // drop the delimiter
        let err = decode(&msg).unwrap_err();
        assert!(matches!(err, WireError::MissingDelimiter { frames: 6 }));
    }

    #[test]
    fn test_decode_truncated_message_is_framing_error() {
        let mut msg = frames(1);
        msg.pop(); // drop the content frame
        let err = decode(&msg).unwrap_err();
        assert!(matches!(err, WireError::WrongFrameCount { got: 4 }));
    }

    #[test]
    fn test_decode_extra_frame_is_framing_error() {
        let mut msg = frames(1);
        msg.push(b"trailing".to_vec());
        let err = decode(&msg).unwrap_err();
        assert!(matches!(err, WireError::WrongFrameCount { got: 6 }));
    }

    #[test]
    fn test_decode_empty_message_is_framing_error() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, WireError::MissingDelimiter { frames: 0 }));
    }

    #[test]
    fn test_decode_non_utf8_signature_is_rejected() {
        let mut msg = frames(1);
        msg[2] = vec![0xFF, 0xFE];
        let err = decode(&msg).unwrap_err();
        assert!(matches!(err, WireError::SignatureNotUtf8));
    }

    #[test]
    fn test_parse_header_rejects_invalid_json() {
        let mut msg = frames(1);
        msg[3] = b"not json".to_vec();
        let env = decode(&msg).unwrap();
        let err = env.parse_header().unwrap_err();
        assert!(matches!(err, WireError::MalformedPart { part: "header", .. }));
    }

    #[test]
    fn test_parse_content_rejects_invalid_json() {
        let mut msg = frames(1);
        msg[6] = b"{truncated".to_vec();
        let env = decode(&msg).unwrap();
        let err = env.parse_content().unwrap_err();
        assert!(matches!(err, WireError::MalformedPart { part: "content", .. }));
    }

    #[test]
    fn test_encode_produces_wire_order() {
        let out = encode(
            "deadbeef",
            [
                b"h".to_vec(),
                b"{}".to_vec(),
                b"{}".to_vec(),
                b"c".to_vec(),
            ],
        );
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], DELIMITER);
        assert_eq!(out[1], b"deadbeef");
        assert_eq!(out[2], b"h");
        assert_eq!(out[5], b"c");
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let env = decode(&frames(1)).unwrap();
        let out = encode(
            &env.signature,
            [
                env.header.clone(),
                env.parent_header.clone(),
                env.metadata.clone(),
                env.content.clone(),
            ],
        );
        // Re-decoding the outbound frames (no identities) yields the same parts.
        let redecoded = decode(&out).unwrap();
        assert_eq!(redecoded.signature, env.signature);
        assert_eq!(redecoded.signed_parts(), env.signed_parts());
    }
}
