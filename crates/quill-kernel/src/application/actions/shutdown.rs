//! ShutdownAction: acknowledges shutdown and trips the process exit flag.
//!
//! Handled on the same single-message path as everything else, so the reply
//! goes out before the flag is observed and the process exits cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use quill_wire::{Header, MsgType};

use crate::application::actions::{Action, ActionError};
use crate::application::broker::MessageBroker;
use crate::infrastructure::transport::Channel;

pub struct ShutdownAction {
    broker: Arc<MessageBroker>,
    shell: Arc<dyn Channel>,
    running: Arc<AtomicBool>,
}

impl ShutdownAction {
    pub fn new(
        broker: Arc<MessageBroker>,
        shell: Arc<dyn Channel>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            broker,
            shell,
            running,
        }
    }
}

#[async_trait]
impl Action for ShutdownAction {
    async fn handle(&self, request: &Header, content: &Value) -> Result<(), ActionError> {
        // Front-ends distinguish restart from full shutdown; echo the flag.
        let restart = content["restart"].as_bool().unwrap_or(false);

        self.broker
            .reply(
                self.shell.as_ref(),
                MsgType::ShutdownReply,
                &json!({"restart": restart}),
                request,
            )
            .await?;

        info!(
            process_id = std::process::id(),
            restart, "shutdown requested"
        );
        self.running.store(false, Ordering::Relaxed);
        Ok(())
    }
}
