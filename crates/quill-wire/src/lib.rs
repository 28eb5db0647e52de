//! # quill-wire
//!
//! Shared library for Quill containing the Jupyter messaging wire format:
//! envelope and header types, the multipart frame codec, the HMAC message
//! signing layer, and the process-wide session identity.
//!
//! This crate is pure protocol logic. It has zero knowledge of message
//! semantics beyond the wire format, and no dependencies on sockets, async
//! runtimes, or the execution engine.
//!
//! - **`protocol`** – How messages travel over the transport. Each message
//!   is a list of frames: routing identities, the `<IDS|MSG>` delimiter, a
//!   hex HMAC signature, and four JSON parts (header, parent_header,
//!   metadata, content) in a fixed order that is also the signing order.
//!
//! - **`session`** – The stable random identity generated once per kernel
//!   lifetime and embedded in every outbound header.

pub mod protocol;
pub mod session;

pub use protocol::codec::{decode, encode, RawEnvelope, WireError, DELIMITER};
pub use protocol::envelope::{Header, MsgType, UnknownMsgType};
pub use protocol::signing::{SchemeError, SignatureScheme, Signer};
pub use session::{Session, USERNAME};
