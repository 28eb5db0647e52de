//! One action per consumed message type.
//!
//! The dispatcher routes each verified inbound message to exactly one
//! [`Action`]. Actions emit their replies through the
//! [`MessageBroker`](crate::application::broker::MessageBroker) on the shell
//! and iopub channels and never touch the transport directly.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use quill_wire::{Header, MsgType};

use crate::application::broker::{BrokerError, MessageBroker};
use crate::infrastructure::transport::Channel;

pub mod execute;
pub mod history;
pub mod kernel_info;
pub mod shutdown;

pub use execute::ExecuteAction;
pub use history::HistoryAction;
pub use kernel_info::KernelInfoAction;
pub use shutdown::ShutdownAction;

/// Error type for action handlers. Caught at the dispatch boundary; an
/// action failure never terminates the message loop.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Expected request content field missing or of the wrong type.
    #[error("request content is missing field `{field}`")]
    MalformedContent { field: &'static str },
}

/// Handler for one consumed message type.
#[async_trait]
pub trait Action: Send + Sync {
    /// Handles one request, emitting any replies through the broker.
    async fn handle(&self, request: &Header, content: &Value) -> Result<(), ActionError>;
}

/// Kernel execution state published on iopub around request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Starting,
    Busy,
    Idle,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Starting => "starting",
            ExecutionState::Busy => "busy",
            ExecutionState::Idle => "idle",
        }
    }
}

/// Publishes a `status` message on iopub. `parent` is `None` only for the
/// initial `starting` announcement, which no request caused.
pub(crate) async fn publish_state(
    broker: &MessageBroker,
    iopub: &dyn Channel,
    state: ExecutionState,
    parent: Option<&Header>,
) -> Result<(), BrokerError> {
    let content = json!({"execution_state": state.as_str()});
    match parent {
        Some(parent) => broker.reply(iopub, MsgType::Status, &content, parent).await,
        None => {
            broker
                .send(iopub, MsgType::Status, &content, &Value::Null, &Value::Null)
                .await
        }
    }
}
