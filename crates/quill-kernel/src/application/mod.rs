//! Application layer for the kernel backend.
//!
//! Use cases in this layer orchestrate the wire protocol types from
//! `quill_wire` to fulfil front-end requests. They depend on abstractions
//! (the [`Channel`](crate::infrastructure::transport::Channel) and
//! [`Interpreter`](engine::Interpreter) traits) rather than concrete sockets
//! or language backends, so every piece is unit-testable with recording
//! doubles.
//!
//! # Sub-modules
//!
//! - **`broker`** – Builds, signs, and sends outbound envelopes. Every
//!   message the kernel publishes goes through it.
//! - **`dispatch`** – Receives inbound shell frames, verifies them, and
//!   routes each to exactly one action. This is the kernel's front door.
//! - **`actions`** – One handler per consumed message type.
//! - **`engine`** – The execution seam; the real language backend plugs in
//!   here.
//! - **`history`** – The in-memory record of executed code feeding
//!   `history_reply`.

pub mod actions;
pub mod broker;
pub mod dispatch;
pub mod engine;
pub mod history;
