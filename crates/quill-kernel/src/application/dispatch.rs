//! ShellDispatcher: the kernel's front door for inbound shell traffic.
//!
//! Each inbound multipart message is decoded, its signature verified over
//! the raw received bytes, and routed to exactly one action. Every failure
//! mode (framing, JSON, integrity, unknown type, action error) is logged
//! and the message dropped; nothing an ill-behaved front-end sends can
//! terminate the loop. Messages are handled to completion one at a time,
//! which is what keeps each request's busy/idle bracket contiguous.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error};

use quill_wire::{decode, MsgType, Signer, WireError};

use crate::application::actions::{
    publish_state, Action, ActionError, ExecuteAction, ExecutionState, HistoryAction,
    KernelInfoAction, ShutdownAction,
};
use crate::application::broker::{BrokerError, MessageBroker};
use crate::application::engine::Interpreter;
use crate::application::history::HistoryStore;
use crate::infrastructure::transport::Channel;

/// Why an inbound message was dropped. Internal to the dispatch boundary;
/// callers of [`ShellDispatcher::handle`] never see it.
#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("signature verification failed")]
    SignatureMismatch,

    #[error("{msg_type} action failed: {source}")]
    Action {
        msg_type: String,
        #[source]
        source: ActionError,
    },
}

/// Routes verified shell messages to their actions.
pub struct ShellDispatcher {
    signer: Signer,
    running: Arc<AtomicBool>,
    execute: ExecuteAction,
    history: HistoryAction,
    kernel_info: KernelInfoAction,
    shutdown: ShutdownAction,
}

impl ShellDispatcher {
    /// Builds the action set and announces `status: starting` on iopub.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the starting announcement cannot be
    /// published.
    pub async fn start(
        broker: Arc<MessageBroker>,
        shell: Arc<dyn Channel>,
        iopub: Arc<dyn Channel>,
        interpreter: Arc<dyn Interpreter>,
        signer: Signer,
        running: Arc<AtomicBool>,
    ) -> Result<Self, BrokerError> {
        let history_store = Arc::new(HistoryStore::new());

        let dispatcher = Self {
            signer,
            running: Arc::clone(&running),
            execute: ExecuteAction::new(
                Arc::clone(&broker),
                Arc::clone(&shell),
                Arc::clone(&iopub),
                interpreter,
                Arc::clone(&history_store),
            ),
            history: HistoryAction::new(
                Arc::clone(&broker),
                Arc::clone(&shell),
                Arc::clone(&iopub),
                history_store,
            ),
            kernel_info: KernelInfoAction::new(
                Arc::clone(&broker),
                Arc::clone(&shell),
                Arc::clone(&iopub),
            ),
            shutdown: ShutdownAction::new(Arc::clone(&broker), shell, running),
        };

        publish_state(&broker, iopub.as_ref(), ExecutionState::Starting, None).await?;

        Ok(dispatcher)
    }

    /// Whether a shutdown request has been handled yet.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Handles one inbound multipart message. Infallible by design: every
    /// failure is logged and the message dropped.
    pub async fn handle(&self, frames: &[Vec<u8>]) {
        if let Err(reason) = self.try_handle(frames).await {
            error!(
                process_id = std::process::id(),
                frames = frames.len(),
                error = %reason,
                "dropped inbound message"
            );
        }
    }

    /// Drains `inbound` until the queue closes or a shutdown is handled.
    pub async fn run(&self, mut inbound: mpsc::UnboundedReceiver<Vec<Vec<u8>>>) {
        while let Some(frames) = inbound.recv().await {
            self.handle(&frames).await;
            if !self.is_running() {
                break;
            }
        }
    }

    async fn try_handle(&self, frames: &[Vec<u8>]) -> Result<(), DispatchError> {
        let envelope = decode(frames)?;

        // Verification runs over the raw received byte buffers, never a
        // re-serialization, so a byte-identical envelope is required.
        if !self
            .signer
            .verify(&envelope.signature, &envelope.signed_parts())
        {
            return Err(DispatchError::SignatureMismatch);
        }

        let header = envelope.parse_header()?;
        let content = envelope.parse_content()?;

        debug!(
            process_id = std::process::id(),
            identities = envelope.identities.len(),
            msg_id = %header.msg_id,
            msg_type = %header.msg_type,
            session = %header.session,
            "received message"
        );

        let routed = match header.msg_type() {
            Ok(MsgType::KernelInfoRequest) => self.kernel_info.handle(&header, &content).await,
            Ok(MsgType::ExecuteRequest) => self.execute.handle(&header, &content).await,
            Ok(MsgType::HistoryRequest) => self.history.handle(&header, &content).await,
            Ok(MsgType::ShutdownRequest) => self.shutdown.handle(&header, &content).await,
            Ok(MsgType::CommOpen) => {
                // Comms are unimplemented. The open is acknowledged by this
                // log line only; no reply goes out.
                debug!(
                    process_id = std::process::id(),
                    msg_id = %header.msg_id,
                    "comm_open received but comms are unimplemented"
                );
                Ok(())
            }
            Ok(other) => {
                error!(
                    process_id = std::process::id(),
                    msg_type = other.as_str(),
                    msg_id = %header.msg_id,
                    "message type is not consumed by this kernel"
                );
                Ok(())
            }
            Err(unknown) => {
                error!(
                    process_id = std::process::id(),
                    msg_type = %header.msg_type,
                    msg_id = %header.msg_id,
                    session = %header.session,
                    error = %unknown,
                    "unknown message type"
                );
                Ok(())
            }
        };

        routed.map_err(|source| DispatchError::Action {
            msg_type: header.msg_type.clone(),
            source,
        })
    }
}
