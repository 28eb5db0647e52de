//! Envelope types for the Jupyter messaging protocol.
//!
//! The logical unit of exchange is the envelope: a `(header, parent_header,
//! metadata, content)` quadruple of JSON objects. On the wire the four parts
//! are serialized in exactly that order, and that exact byte sequence is what
//! gets signed — see [`crate::protocol::signing`].
//!
//! Empty logical maps serialize as `{}`, never `[]` or `null`; the protocol
//! distinguishes these on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Message type vocabulary ───────────────────────────────────────────────────

/// All message type strings Quill consumes or produces, as a closed enum.
///
/// The reference behaviour dispatches on raw strings; modelling the
/// vocabulary as an enum makes the routing table exhaustive, so adding a
/// type is a compile-time-checked change. Strings outside this vocabulary
/// surface as [`UnknownMsgType`] and are handled by the dispatcher's
/// unknown-type path, never by a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgType {
    // Consumed on the shell channel
    KernelInfoRequest,
    ExecuteRequest,
    HistoryRequest,
    ShutdownRequest,
    CommOpen,
    // Produced on the shell channel
    KernelInfoReply,
    ExecuteReply,
    HistoryReply,
    ShutdownReply,
    // Produced on the iopub channel
    Status,
    Stream,
    ExecuteInput,
    ExecuteResult,
    Error,
}

/// A `msg_type` string outside the known protocol vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message type {0:?}")]
pub struct UnknownMsgType(pub String);

impl MsgType {
    /// Returns the wire string for this message type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MsgType::KernelInfoRequest => "kernel_info_request",
            MsgType::ExecuteRequest => "execute_request",
            MsgType::HistoryRequest => "history_request",
            MsgType::ShutdownRequest => "shutdown_request",
            MsgType::CommOpen => "comm_open",
            MsgType::KernelInfoReply => "kernel_info_reply",
            MsgType::ExecuteReply => "execute_reply",
            MsgType::HistoryReply => "history_reply",
            MsgType::ShutdownReply => "shutdown_reply",
            MsgType::Status => "status",
            MsgType::Stream => "stream",
            MsgType::ExecuteInput => "execute_input",
            MsgType::ExecuteResult => "execute_result",
            MsgType::Error => "error",
        }
    }
}

impl FromStr for MsgType {
    type Err = UnknownMsgType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kernel_info_request" => Ok(MsgType::KernelInfoRequest),
            "execute_request" => Ok(MsgType::ExecuteRequest),
            "history_request" => Ok(MsgType::HistoryRequest),
            "shutdown_request" => Ok(MsgType::ShutdownRequest),
            "comm_open" => Ok(MsgType::CommOpen),
            "kernel_info_reply" => Ok(MsgType::KernelInfoReply),
            "execute_reply" => Ok(MsgType::ExecuteReply),
            "history_reply" => Ok(MsgType::HistoryReply),
            "shutdown_reply" => Ok(MsgType::ShutdownReply),
            "status" => Ok(MsgType::Status),
            "stream" => Ok(MsgType::Stream),
            "execute_input" => Ok(MsgType::ExecuteInput),
            "execute_result" => Ok(MsgType::ExecuteResult),
            "error" => Ok(MsgType::Error),
            other => Err(UnknownMsgType(other.to_string())),
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Message header ────────────────────────────────────────────────────────────

/// The header carried by every protocol message.
///
/// Serde serializes fields in declaration order, so serializing a `Header`
/// always yields the same byte sequence for the same field values — the
/// property the signing layer relies on.
///
/// `msg_type` is kept as a raw string rather than [`MsgType`] so that a
/// message with an out-of-vocabulary type still *decodes*; classification
/// happens at dispatch time, where unknown types are logged and dropped
/// instead of being conflated with JSON decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Fresh UUID v4, unique per message.
    pub msg_id: String,
    /// ISO-8601 timestamp with timezone, recorded at header creation.
    pub date: String,
    /// Fixed literal identifying the kernel side of the conversation.
    pub username: String,
    /// The process-lifetime session id (UUID string).
    pub session: String,
    /// Wire message type string.
    pub msg_type: String,
}

impl Header {
    /// Classifies this header's `msg_type` against the known vocabulary.
    pub fn msg_type(&self) -> Result<MsgType, UnknownMsgType> {
        self.msg_type.parse()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_string_round_trip() {
        let all = [
            MsgType::KernelInfoRequest,
            MsgType::ExecuteRequest,
            MsgType::HistoryRequest,
            MsgType::ShutdownRequest,
            MsgType::CommOpen,
            MsgType::KernelInfoReply,
            MsgType::ExecuteReply,
            MsgType::HistoryReply,
            MsgType::ShutdownReply,
            MsgType::Status,
            MsgType::Stream,
            MsgType::ExecuteInput,
            MsgType::ExecuteResult,
            MsgType::Error,
        ];
        for ty in all {
            assert_eq!(ty.as_str().parse::<MsgType>(), Ok(ty));
        }
    }

    #[test]
    fn test_unknown_msg_type_is_an_error() {
        let err = "frobnicate".parse::<MsgType>().unwrap_err();
        assert_eq!(err, UnknownMsgType("frobnicate".to_string()));
    }

    #[test]
    fn test_empty_msg_type_is_an_error() {
        assert!("".parse::<MsgType>().is_err());
    }

    #[test]
    fn test_msg_type_serde_uses_wire_string() {
        let json = serde_json::to_string(&MsgType::ExecuteRequest).unwrap();
        assert_eq!(json, r#""execute_request""#);
        let back: MsgType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MsgType::ExecuteRequest);
    }

    #[test]
    fn test_header_serializes_fields_in_signing_order() {
        let header = Header {
            msg_id: "id".to_string(),
            date: "2026-01-01T00:00:00+00:00".to_string(),
            username: "kernel".to_string(),
            session: "sess".to_string(),
            msg_type: "status".to_string(),
        };
        let json = serde_json::to_string(&header).unwrap();
        let msg_id_pos = json.find("msg_id").unwrap();
        let date_pos = json.find("date").unwrap();
        let username_pos = json.find("username").unwrap();
        let session_pos = json.find("session").unwrap();
        let msg_type_pos = json.find("msg_type").unwrap();
        assert!(msg_id_pos < date_pos);
        assert!(date_pos < username_pos);
        assert!(username_pos < session_pos);
        assert!(session_pos < msg_type_pos);
    }

    #[test]
    fn test_header_with_unknown_type_still_decodes() {
        let json = r#"{
            "msg_id": "abc",
            "date": "2026-01-01T00:00:00+00:00",
            "username": "client",
            "session": "s1",
            "msg_type": "frobnicate"
        }"#;
        let header: Header = serde_json::from_str(json).unwrap();
        assert!(header.msg_type().is_err());
    }
}
