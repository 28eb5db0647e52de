//! Transport channel seam between the kernel and its host socket pump.
//!
//! The kernel never creates or binds sockets itself. Each logical Jupyter
//! channel (shell, iopub, stdin, control) is represented by a [`Channel`],
//! and the host process decides where the frames actually go. The shipped
//! [`MpscChannel`] hands frames to an in-process queue; test code substitutes
//! recording doubles.

use std::io;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// One logical outbound channel. A multipart message is delivered with a
/// single call; partial writes are the transport's problem, not ours.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Sends one complete multipart message.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure as an I/O error; no retry happens at
    /// this layer.
    async fn send_multipart(&self, frames: Vec<Vec<u8>>) -> io::Result<()>;
}

/// A [`Channel`] backed by an in-process queue.
///
/// The receiving half is handed to whatever socket pump hosts the kernel.
pub struct MpscChannel {
    name: &'static str,
    tx: mpsc::UnboundedSender<Vec<Vec<u8>>>,
}

impl MpscChannel {
    /// Creates a named channel and returns the receiving half for the host.
    pub fn new(name: &'static str) -> (Self, mpsc::UnboundedReceiver<Vec<Vec<u8>>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { name, tx }, rx)
    }

    /// The channel name used in logs ("shell", "iopub", ...).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[async_trait]
impl Channel for MpscChannel {
    async fn send_multipart(&self, frames: Vec<Vec<u8>>) -> io::Result<()> {
        self.tx.send(frames).map_err(|_| {
            io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} channel receiver dropped", self.name),
            )
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
