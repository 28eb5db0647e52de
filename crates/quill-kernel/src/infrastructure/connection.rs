//! Jupyter connection-file loading.
//!
//! A front-end launches the kernel with a path to a JSON connection file
//! describing the five channel ports, the transport, and the signing key:
//!
//! ```json
//! {
//!   "ip": "127.0.0.1",
//!   "transport": "tcp",
//!   "key": "a0436f6c-1916-498b-8eb9-e81ab9368e84",
//!   "signature_scheme": "hmac-sha256",
//!   "shell_port": 57503,
//!   "iopub_port": 40885,
//!   "stdin_port": 52858,
//!   "control_port": 40154,
//!   "hb_port": 57145
//! }
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when absent, so files written by older front-ends still
//! load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_wire::{SchemeError, Signer};

/// Error type for connection-file operations.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A file system I/O error occurred.
    #[error("I/O error reading connection file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON content could not be parsed.
    #[error("failed to parse connection file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parsed contents of a Jupyter connection file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionInfo {
    /// IP address the front-end bound the channel sockets to.
    #[serde(default = "default_ip")]
    pub ip: String,
    /// Socket transport, normally `"tcp"`.
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Signing key. An empty key selects unsigned mode.
    #[serde(default)]
    pub key: String,
    /// Scheme string of the form `"hmac-<algorithm>"`.
    #[serde(default = "default_signature_scheme")]
    pub signature_scheme: String,
    pub shell_port: u16,
    pub iopub_port: u16,
    pub stdin_port: u16,
    pub control_port: u16,
    pub hb_port: u16,
}

fn default_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_transport() -> String {
    "tcp".to_string()
}
fn default_signature_scheme() -> String {
    "hmac-sha256".to_string()
}

impl ConnectionInfo {
    /// Loads and parses the connection file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Io`] for file-system failures and
    /// [`ConnectionError::Parse`] if the JSON is malformed.
    pub fn load(path: &Path) -> Result<Self, ConnectionError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConnectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Builds the message signer from the key and scheme string.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] when the scheme string is malformed or names
    /// an unsupported algorithm. This is checked once at startup, never at
    /// first send.
    pub fn signer(&self) -> Result<Signer, SchemeError> {
        Signer::from_scheme_str(self.key.as_bytes(), &self.signature_scheme)
    }

    /// Formats the endpoint address for one channel port, e.g.
    /// `tcp://127.0.0.1:57503`.
    pub fn endpoint(&self, port: u16) -> String {
        format!("{}://{}:{}", self.transport, self.ip, port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
