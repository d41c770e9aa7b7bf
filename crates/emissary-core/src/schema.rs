use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::AgentError;

/// A compiled JSON schema together with its source document.
///
/// Thin wrapper around the `jsonschema` crate; the rest of the core only
/// ever asks "does this document conform, and if not, why". Compilation,
/// draft selection, and reference resolution stay behind this boundary.
#[derive(Clone)]
pub struct Schema {
    raw: Value,
    compiled: Arc<JSONSchema>,
}

impl Schema {
    /// Compile a schema document.
    ///
    /// Schemas only ever arrive via a module manifest, so a bad one is a
    /// [`AgentError::Module`].
    pub fn compile(raw: Value) -> Result<Self, AgentError> {
        let compiled = JSONSchema::compile(&raw)
            .map_err(|e| AgentError::Module(format!("invalid schema in module metadata: {e}")))?;
        Ok(Schema {
            raw,
            compiled: Arc::new(compiled),
        })
    }

    /// Validate `document`, returning the violation list. Empty means valid.
    pub fn validate(&self, document: &Value) -> Vec<String> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| e.to_string()).collect(),
        }
    }

    /// The schema document as written in the module manifest.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("raw", &self.raw).finish()
    }
}
