//! Process-wide session identity and header minting.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::protocol::envelope::{Header, MsgType};

/// Fixed username literal identifying the kernel side of the conversation.
pub const USERNAME: &str = "kernel";

/// The stable random identifier generated once per kernel lifetime.
///
/// Embedded in every outbound header; never mutated after construction, so
/// it can be cloned freely across components without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
}

impl Session {
    /// Generates a fresh session identity.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Reconstructs a session from a known id (used by tests and by hosts
    /// that persist the session across a restart).
    pub fn from_id(id: Uuid) -> Self {
        Self { id }
    }

    /// Returns the session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mints a header for one outbound message: fresh `msg_id`, current
    /// ISO-8601 timestamp, fixed username, this session's id, given type.
    pub fn header(&self, msg_type: MsgType) -> Header {
        Header {
            msg_id: Uuid::new_v4().to_string(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            username: USERNAME.to_string(),
            session: self.id.to_string(),
            msg_type: msg_type.as_str().to_string(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
