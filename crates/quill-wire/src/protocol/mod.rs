//! Protocol module containing envelope types, the multipart codec, and signing.

pub mod codec;
pub mod envelope;
pub mod signing;

pub use codec::{decode, encode, RawEnvelope, WireError};
pub use envelope::{Header, MsgType};
pub use signing::{SignatureScheme, Signer};
