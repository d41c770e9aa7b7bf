use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// A task request as decoded from the transport envelope.
///
/// The message bus hands over an envelope/data/debug triple; only `data` is
/// interpreted here. Debug chunks and the invalid-debug-chunk count pass
/// through untouched for downstream diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub envelope: Value,
    pub data: Value,
    #[serde(default)]
    pub debug: Vec<Value>,
    #[serde(default)]
    pub invalid_debug_chunks: usize,
}

/// The `{module, action, params}` document carried in a request's data
/// chunk. Serialized verbatim to the module process stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub module: String,
    pub action: String,
    #[serde(default)]
    pub params: Value,
}

impl ActionRequest {
    /// Wrap a bare data document, with an empty envelope and no debug
    /// chunks. Test harnesses and the CLI build requests this way.
    pub fn new(data: Value) -> Self {
        ActionRequest {
            data,
            ..Default::default()
        }
    }

    /// Decode the data chunk into its payload.
    pub fn payload(&self) -> Result<RequestPayload, AgentError> {
        serde_json::from_value(self.data.clone()).map_err(|e| AgentError::RequestValidation {
            violations: vec![format!(
                "request data is not a {{module, action, params}} document: {e}"
            )],
        })
    }
}
