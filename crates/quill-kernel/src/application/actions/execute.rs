//! ExecuteAction: runs submitted code and publishes the full reply sequence.
//!
//! For each `execute_request` the front-end observes, in order, on iopub:
//! `status: busy`, `execute_input`, zero or more `stream` chunks, an
//! `execute_result` when the evaluation produced a value (or an `error`
//! content when it failed), and finally `status: idle`. The shell channel
//! carries exactly one `execute_reply`. Because the dispatcher runs messages
//! to completion one at a time, two requests' busy/idle brackets can never
//! interleave.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

use quill_wire::{Header, MsgType};

use crate::application::actions::{publish_state, Action, ActionError, ExecutionState};
use crate::application::broker::MessageBroker;
use crate::application::engine::{EvalError, Interpreter};
use crate::application::history::HistoryStore;
use crate::infrastructure::transport::Channel;

pub struct ExecuteAction {
    broker: Arc<MessageBroker>,
    shell: Arc<dyn Channel>,
    iopub: Arc<dyn Channel>,
    interpreter: Arc<dyn Interpreter>,
    history: Arc<HistoryStore>,
    execution_count: AtomicU32,
}

impl ExecuteAction {
    pub fn new(
        broker: Arc<MessageBroker>,
        shell: Arc<dyn Channel>,
        iopub: Arc<dyn Channel>,
        interpreter: Arc<dyn Interpreter>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            broker,
            shell,
            iopub,
            interpreter,
            history,
            execution_count: AtomicU32::new(0),
        }
    }

    /// Executions completed so far.
    pub fn execution_count(&self) -> u32 {
        self.execution_count.load(Ordering::Relaxed)
    }

    async fn publish_success(
        &self,
        request: &Header,
        count: u32,
        result: Option<String>,
    ) -> Result<(), ActionError> {
        if let Some(text) = result {
            self.broker
                .reply(
                    self.iopub.as_ref(),
                    MsgType::ExecuteResult,
                    &json!({
                        "execution_count": count,
                        "data": {"text/plain": text},
                        "metadata": {},
                    }),
                    request,
                )
                .await?;
        }

        self.broker
            .reply(
                self.shell.as_ref(),
                MsgType::ExecuteReply,
                &json!({
                    "status": "ok",
                    "execution_count": count,
                    "payload": [],
                    "user_expressions": {},
                }),
                request,
            )
            .await?;
        Ok(())
    }

    async fn publish_failure(
        &self,
        request: &Header,
        count: u32,
        error: &EvalError,
    ) -> Result<(), ActionError> {
        let error_content = json!({
            "ename": error.ename,
            "evalue": error.evalue,
            "traceback": error.traceback,
        });

        self.broker
            .reply(self.iopub.as_ref(), MsgType::Error, &error_content, request)
            .await?;

        self.broker
            .reply(
                self.shell.as_ref(),
                MsgType::ExecuteReply,
                &json!({
                    "status": "error",
                    "execution_count": count,
                    "ename": error.ename,
                    "evalue": error.evalue,
                    "traceback": error.traceback,
                }),
                request,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Action for ExecuteAction {
    async fn handle(&self, request: &Header, content: &Value) -> Result<(), ActionError> {
        let code = content["code"]
            .as_str()
            .ok_or(ActionError::MalformedContent { field: "code" })?;

        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Busy, Some(request))
            .await?;

        let count = self.execution_count.fetch_add(1, Ordering::Relaxed) + 1;

        self.broker
            .reply(
                self.iopub.as_ref(),
                MsgType::ExecuteInput,
                &json!({"code": code, "execution_count": count}),
                request,
            )
            .await?;

        let (output_tx, mut output_rx) = mpsc::unbounded_channel();
        let outcome = self.interpreter.evaluate(code, output_tx).await;

        // The evaluation has returned and all senders are dropped, so this
        // drains every captured chunk without blocking.
        while let Ok(chunk) = output_rx.try_recv() {
            self.broker
                .reply(
                    self.iopub.as_ref(),
                    MsgType::Stream,
                    &json!({"name": "stdout", "text": chunk}),
                    request,
                )
                .await?;
        }

        self.history.append(&request.session, count, code);

        match outcome {
            Ok(evaluation) => {
                self.publish_success(request, count, evaluation.result)
                    .await?
            }
            Err(error) => {
                debug!(
                    process_id = std::process::id(),
                    execution_count = count,
                    ename = %error.ename,
                    "evaluation failed"
                );
                self.publish_failure(request, count, &error).await?
            }
        }

        publish_state(&self.broker, self.iopub.as_ref(), ExecutionState::Idle, Some(request))
            .await?;
        Ok(())
    }
}
