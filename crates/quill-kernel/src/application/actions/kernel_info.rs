//! KernelInfoAction: answers the capability handshake.
//!
//! `kernel_info_request` is the first thing most front-ends send; the reply
//! describes the protocol version and the language backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use quill_wire::{Header, MsgType};

use crate::application::actions::{publish_state, Action, ActionError, ExecutionState};
use crate::application::broker::MessageBroker;
use crate::infrastructure::transport::Channel;

/// Protocol revision this kernel implements.
pub const PROTOCOL_VERSION: &str = "5.3";

pub struct KernelInfoAction {
    broker: Arc<MessageBroker>,
    shell: Arc<dyn Channel>,
    iopub: Arc<dyn Channel>,
}

impl KernelInfoAction {
    pub fn new(
        broker: Arc<MessageBroker>,
        shell: Arc<dyn Channel>,
        iopub: Arc<dyn Channel>,
    ) -> Self {
        Self {
            broker,
            shell,
            iopub,
        }
    }

    fn reply_content() -> Value {
        json!({
            "protocol_version": PROTOCOL_VERSION,
            "implementation": "quill",
            "implementation_version": env!("CARGO_PKG_VERSION"),
            "language_info": {
                "name": "quill",
                "version": env!("CARGO_PKG_VERSION"),
                "mimetype": "text/plain",
                "file_extension": ".txt",
            },
            "banner": concat!("Quill kernel ", env!("CARGO_PKG_VERSION")),
        })
    }
}

#[async_trait]
impl Action for KernelInfoAction {
    async fn handle(&self, request: &Header, _content: &Value) -> Result<(), ActionError> {
        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Busy, Some(request))
            .await?;

        self.broker
            .reply(
                self.shell.as_ref(),
                MsgType::KernelInfoReply,
                &Self::reply_content(),
                request,
            )
            .await?;

        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Idle, Some(request))
            .await?;
        Ok(())
    }
}
