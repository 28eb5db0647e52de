//! Execution seam between the kernel and the language backend.
//!
//! The kernel itself never evaluates code. [`ExecuteAction`] hands each
//! request to an [`Interpreter`] and forwards whatever the interpreter wrote
//! to the output sink as `stream` messages. Output capture is modeled as an
//! mpsc channel so the backend stays decoupled from any socket.
//!
//! [`ExecuteAction`]: crate::application::actions::execute::ExecuteAction

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// A failed evaluation, shaped the way `error` content and error
/// `execute_reply` messages report it to the front-end.
#[derive(Debug, Clone, Error)]
#[error("{ename}: {evalue}")]
pub struct EvalError {
    /// Error class name (e.g. `"ParseError"`).
    pub ename: String,
    /// Human-readable error value.
    pub evalue: String,
    /// Traceback lines, possibly empty.
    pub traceback: Vec<String>,
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Textual representation of the produced value, if the code produced
    /// one. `None` suppresses the `execute_result` message.
    pub result: Option<String>,
}

/// The language backend capability.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Evaluates `code`, writing any stdout-like output chunks to `output`
    /// as they are produced.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when the code fails; the kernel reports the
    /// failure to the front-end and stays alive.
    async fn evaluate(
        &self,
        code: &str,
        output: mpsc::UnboundedSender<String>,
    ) -> Result<Evaluation, EvalError>;
}

/// Stand-in backend that returns the submitted source as its result.
///
/// Used for wiring the binary and in tests; a real language backend replaces
/// it at construction time.
#[derive(Debug, Default)]
pub struct EchoInterpreter;

#[async_trait]
impl Interpreter for EchoInterpreter {
    async fn evaluate(
        &self,
        code: &str,
        _output: mpsc::UnboundedSender<String>,
    ) -> Result<Evaluation, EvalError> {
        Ok(Evaluation {
            result: Some(code.trim().to_string()),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_interpreter_returns_trimmed_source() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let eval = EchoInterpreter
            .evaluate("  1 + 1\n", tx)
            .await
            .expect("echo never fails");
        assert_eq!(eval.result.as_deref(), Some("1 + 1"));
    }
}
