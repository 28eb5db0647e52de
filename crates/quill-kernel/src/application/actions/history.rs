//! HistoryAction: serves the recorded execution history.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use quill_wire::{Header, MsgType};

use crate::application::actions::{publish_state, Action, ActionError, ExecutionState};
use crate::application::broker::MessageBroker;
use crate::application::history::HistoryStore;
use crate::infrastructure::transport::Channel;

pub struct HistoryAction {
    broker: Arc<MessageBroker>,
    shell: Arc<dyn Channel>,
    iopub: Arc<dyn Channel>,
    history: Arc<HistoryStore>,
}

impl HistoryAction {
    pub fn new(
        broker: Arc<MessageBroker>,
        shell: Arc<dyn Channel>,
        iopub: Arc<dyn Channel>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            broker,
            shell,
            iopub,
            history,
        }
    }
}

#[async_trait]
impl Action for HistoryAction {
    async fn handle(&self, request: &Header, _content: &Value) -> Result<(), ActionError> {
        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Busy, Some(request))
            .await?;

        self.broker
            .reply(
                self.shell.as_ref(),
                MsgType::HistoryReply,
                &json!({"history": self.history.as_reply_rows()}),
                request,
            )
            .await?;

        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Idle, Some(request))
            .await?;
        Ok(())
    }
}
