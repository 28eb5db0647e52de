//! Infrastructure layer for the kernel backend.
//!
//! Contains the outward-facing adapters: the transport channel seam that the
//! host socket pump plugs into, and connection-file loading.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `quill_wire`, but MUST NOT be imported by the wire protocol layer.

pub mod connection;
pub mod transport;
