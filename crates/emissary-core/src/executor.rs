//! Action execution: validate → spawn → interpret, in strict order.
//!
//! Both execution modes share one pipeline. The blocking path runs it
//! inline and hands back an [`Outcome`]; the non-blocking path runs the
//! spawn/interpret half on a detached task, records the terminal state in
//! the [`StatusSpool`], and resolves a completion channel. Input is never
//! validated after a process exists, and a process is never spawned on
//! invalid input.

use std::path::Path;

use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::action::Action;
use crate::error::AgentError;
use crate::process::{self, ProcessOutput};
use crate::request::{ActionRequest, RequestPayload};
use crate::spool::{StatusRecord, StatusSpool};

// ─── Outcome ──────────────────────────────────────────────────────────────

/// Result of a blocking invocation. `stdout`/`stderr` are the raw process
/// output, verbatim; `result` is the parsed stdout document after it passed
/// the action's output schema.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub result: Value,
}

// ─── ActionHandle ─────────────────────────────────────────────────────────

/// Handle on a detached invocation: the request identifier (the key into
/// the spool) plus a completion channel resolved with the terminal record.
///
/// The channel is the primary completion signal; the durable spool record
/// is the crash-recoverable projection for components that only hold the
/// identifier.
#[derive(Debug)]
pub struct ActionHandle {
    request_id: String,
    completion: oneshot::Receiver<StatusRecord>,
}

impl ActionHandle {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Wait for the terminal record. `None` only if the completion handler
    /// disappeared without reporting, which does not happen in normal
    /// operation; the spool record remains the fallback either way.
    pub async fn wait(self) -> Option<StatusRecord> {
        self.completion.await.ok()
    }
}

// ─── Blocking path ────────────────────────────────────────────────────────

pub(crate) async fn execute_blocking(
    action: &Action,
    module_path: &Path,
    action_name: &str,
    request: &ActionRequest,
) -> Result<Outcome, AgentError> {
    let payload = validated_payload(action, request)?;
    let doc = payload_doc(&payload)?;
    let output = process::run_module(module_path, action_name, Some(&doc))
        .await
        .map_err(spawn_error)?;
    interpret(action, output)
}

// ─── Non-blocking path ────────────────────────────────────────────────────

pub(crate) async fn execute_detached(
    action: &Action,
    module_path: &Path,
    action_name: &str,
    request: &ActionRequest,
    spool: &StatusSpool,
) -> Result<ActionHandle, AgentError> {
    let payload = validated_payload(action, request)?;
    let doc = payload_doc(&payload)?;

    let request_id = Uuid::new_v4().to_string();
    // The running record must exist before the process does: a reader that
    // knows the identifier always finds at least `running`.
    spool
        .mark_running(&request_id)
        .map_err(|e| AgentError::RequestProcessing {
            reason: format!("failed to record request status: {e}"),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
        })?;

    let (tx, rx) = oneshot::channel();
    let action = action.clone();
    let module_path = module_path.to_path_buf();
    let action_name = action_name.to_string();
    let spool = spool.clone();
    let id = request_id.clone();

    tokio::spawn(async move {
        let record = match process::run_module(&module_path, &action_name, Some(&doc)).await {
            Ok(output) => match interpret(&action, output) {
                Ok(outcome) => StatusRecord::Completed {
                    result: outcome.result,
                },
                Err(e) => StatusRecord::Failed {
                    error: e.to_string(),
                },
            },
            Err(e) => StatusRecord::Failed {
                error: format!("failed to spawn module process: {e}"),
            },
        };

        if let StatusRecord::Failed { error } = &record {
            tracing::warn!(request_id = %id, action = %action_name, "detached action failed: {error}");
        }
        if let Err(e) = spool.write_terminal(&id, &record) {
            tracing::error!(request_id = %id, "failed to write terminal status record: {e}");
        }
        let _ = tx.send(record);
    });

    Ok(ActionHandle {
        request_id,
        completion: rx,
    })
}

// ─── Shared pipeline ──────────────────────────────────────────────────────

/// Decode the payload and check it against the input schema. No process is
/// spawned unless this returns with zero violations.
fn validated_payload(
    action: &Action,
    request: &ActionRequest,
) -> Result<RequestPayload, AgentError> {
    let payload = request.payload()?;
    let violations = action.input().validate(&payload.params);
    if !violations.is_empty() {
        return Err(AgentError::RequestValidation { violations });
    }
    Ok(payload)
}

fn payload_doc(payload: &RequestPayload) -> Result<Value, AgentError> {
    serde_json::to_value(payload).map_err(|e| AgentError::RequestProcessing {
        reason: format!("failed to serialize request document: {e}"),
        stdout: String::new(),
        stderr: String::new(),
        exit_code: None,
    })
}

fn spawn_error(e: std::io::Error) -> AgentError {
    AgentError::RequestProcessing {
        reason: format!("failed to spawn module process: {e}"),
        stdout: String::new(),
        stderr: String::new(),
        exit_code: None,
    }
}

/// Interpret a finished process: exit status, then JSON parse, then output
/// schema, in that order. Raw stdout/stderr travel with every failure so
/// the caller can inspect what the module actually produced.
fn interpret(action: &Action, output: ProcessOutput) -> Result<Outcome, AgentError> {
    let ProcessOutput {
        stdout,
        stderr,
        code,
    } = output;

    let exit_code = match code {
        Some(c) => c,
        None => {
            return Err(AgentError::RequestProcessing {
                reason: "module process terminated by signal".to_string(),
                stdout,
                stderr,
                exit_code: None,
            })
        }
    };

    if exit_code != 0 {
        let reason = if stderr.trim().is_empty() {
            format!("module process exited with code {exit_code}")
        } else {
            format!(
                "module process exited with code {exit_code}: {}",
                stderr.trim()
            )
        };
        return Err(AgentError::RequestProcessing {
            reason,
            stdout,
            stderr,
            exit_code: Some(exit_code),
        });
    }

    let result: Value = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return Err(AgentError::RequestProcessing {
                reason: format!("module output is not valid JSON: {e}"),
                stdout,
                stderr,
                exit_code: Some(exit_code),
            })
        }
    };

    let violations = action.output().validate(&result);
    if !violations.is_empty() {
        return Err(AgentError::RequestProcessing {
            reason: format!(
                "module output failed schema validation: {}",
                violations.join("; ")
            ),
            stdout,
            stderr,
            exit_code: Some(exit_code),
        });
    }

    Ok(Outcome {
        stdout,
        stderr,
        exit_code,
        result,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
