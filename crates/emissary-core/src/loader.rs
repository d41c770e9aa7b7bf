//! Module discovery: the metadata protocol and manifest checks.
//!
//! `load` runs the module's reserved `metadata` selector, checks the
//! returned manifest against a fixed meta-schema, and builds the action
//! table. The metadata query is the only subprocess spawned at load time.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::action::Action;
use crate::error::AgentError;
use crate::module::ExternalModule;
use crate::process;
use crate::schema::Schema;

/// Reserved selector every module must answer with its manifest.
pub const METADATA_SELECTOR: &str = "metadata";

#[derive(Debug, Deserialize)]
struct ModuleManifest {
    actions: Vec<ActionManifest>,
}

#[derive(Debug, Deserialize)]
struct ActionManifest {
    name: String,
    input: Value,
    output: Value,
}

static META_SCHEMA: OnceLock<Schema> = OnceLock::new();

/// Shape every manifest must satisfy before its declared schemas are even
/// compiled.
fn meta_schema() -> &'static Schema {
    META_SCHEMA.get_or_init(|| {
        Schema::compile(json!({
            "type": "object",
            "required": ["actions"],
            "properties": {
                "actions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "input", "output"],
                        "properties": {
                            "name": { "type": "string", "minLength": 1 },
                            "input": { "type": "object" },
                            "output": { "type": "object" }
                        }
                    }
                }
            }
        }))
        .expect("manifest meta-schema is valid")
    })
}

/// Load the module at `path` by invoking its metadata query.
///
/// Fails with [`AgentError::Module`] when the path is not an executable
/// file, the metadata query cannot be run or does not exit cleanly, the
/// manifest is not well-formed JSON, or the manifest fails the meta-schema.
/// On success the returned module's action table is complete and immutable;
/// there is no partially-populated state.
pub async fn load(path: &Path) -> Result<ExternalModule, AgentError> {
    let name = module_name(path)?;
    ensure_executable(path)?;

    let output = process::run_module(path, METADATA_SELECTOR, None)
        .await
        .map_err(|e| AgentError::Module(format!("metadata query for '{name}' failed to run: {e}")))?;

    match output.code {
        Some(0) => {}
        Some(code) => {
            return Err(AgentError::Module(format!(
                "metadata query for '{name}' exited with code {code}: {}",
                output.stderr.trim()
            )))
        }
        None => {
            return Err(AgentError::Module(format!(
                "metadata query for '{name}' was terminated by a signal"
            )))
        }
    }

    let manifest: Value = serde_json::from_str(&output.stdout)
        .map_err(|e| AgentError::Module(format!("metadata for '{name}' is not valid JSON: {e}")))?;

    let actions = build_actions(&name, &manifest)?;
    tracing::debug!(module = %name, actions = actions.len(), "loaded module");
    Ok(ExternalModule::new(name, path.to_path_buf(), actions))
}

/// Check the manifest against the meta-schema and compile one [`Action`]
/// per entry. All-or-nothing: any bad entry fails the whole load.
fn build_actions(name: &str, manifest: &Value) -> Result<BTreeMap<String, Action>, AgentError> {
    let violations = meta_schema().validate(manifest);
    if !violations.is_empty() {
        return Err(AgentError::Module(format!(
            "metadata for '{name}' failed validation: {}",
            violations.join("; ")
        )));
    }

    let manifest: ModuleManifest = serde_json::from_value(manifest.clone())
        .map_err(|e| AgentError::Module(format!("metadata for '{name}' is malformed: {e}")))?;

    let mut actions = BTreeMap::new();
    for entry in manifest.actions {
        let action = Action::new(Schema::compile(entry.input)?, Schema::compile(entry.output)?);
        if actions.insert(entry.name.clone(), action).is_some() {
            return Err(AgentError::Module(format!(
                "metadata for '{name}' declares action '{}' twice",
                entry.name
            )));
        }
    }
    Ok(actions)
}

fn module_name(path: &Path) -> Result<String, AgentError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            AgentError::Module(format!(
                "module path '{}' has no usable file name",
                path.display()
            ))
        })
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> Result<(), AgentError> {
    use std::os::unix::fs::PermissionsExt;

    let meta = std::fs::metadata(path)
        .map_err(|e| AgentError::Module(format!("cannot stat module '{}': {e}", path.display())))?;
    if !meta.is_file() || meta.permissions().mode() & 0o111 == 0 {
        return Err(AgentError::Module(format!(
            "module '{}' is not an executable file",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(path: &Path) -> Result<(), AgentError> {
    if !path.is_file() {
        return Err(AgentError::Module(format!(
            "module '{}' is not a file",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivial_schema() -> Value {
        json!({"type": "object"})
    }

    #[test]
    fn build_actions_populates_the_full_table() {
        let manifest = json!({
            "actions": [
                {"name": "reverse", "input": trivial_schema(), "output": trivial_schema()},
                {"name": "count", "input": trivial_schema(), "output": trivial_schema()},
            ]
        });
        let actions = build_actions("demo", &manifest).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(actions.contains_key("reverse"));
        assert!(actions.contains_key("count"));
    }

    #[test]
    fn manifest_without_actions_key_is_rejected() {
        let err = build_actions("demo", &json!({"operations": []})).unwrap_err();
        assert!(matches!(err, AgentError::Module(_)));
    }

    #[test]
    fn manifest_entry_missing_a_schema_is_rejected() {
        let manifest = json!({
            "actions": [{"name": "reverse", "input": trivial_schema()}]
        });
        let err = build_actions("demo", &manifest).unwrap_err();
        assert!(matches!(err, AgentError::Module(_)));
    }

    #[test]
    fn manifest_with_empty_action_name_is_rejected() {
        let manifest = json!({
            "actions": [{"name": "", "input": trivial_schema(), "output": trivial_schema()}]
        });
        let err = build_actions("demo", &manifest).unwrap_err();
        assert!(matches!(err, AgentError::Module(_)));
    }

    #[test]
    fn duplicate_action_names_are_rejected() {
        let manifest = json!({
            "actions": [
                {"name": "reverse", "input": trivial_schema(), "output": trivial_schema()},
                {"name": "reverse", "input": trivial_schema(), "output": trivial_schema()},
            ]
        });
        let err = build_actions("demo", &manifest).unwrap_err();
        let AgentError::Module(msg) = err else {
            panic!("expected Module error");
        };
        assert!(msg.contains("twice"));
    }

    #[test]
    fn undeclarable_schema_fails_the_whole_load() {
        let manifest = json!({
            "actions": [
                {"name": "ok", "input": trivial_schema(), "output": trivial_schema()},
                {"name": "bad", "input": {"type": "no-such-type"}, "output": trivial_schema()},
            ]
        });
        assert!(build_actions("demo", &manifest).is_err());
    }

    #[test]
    fn module_name_is_the_file_stem() {
        assert_eq!(module_name(Path::new("/opt/modules/reverse")).unwrap(), "reverse");
        assert_eq!(module_name(Path::new("/opt/modules/reverse.sh")).unwrap(), "reverse");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_path_is_rejected_before_any_spawn() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain");
        std::fs::write(&path, "not a program").unwrap();
        let err = load(&path).await.unwrap_err();
        let AgentError::Module(msg) = err else {
            panic!("expected Module error");
        };
        assert!(msg.contains("not an executable"));
    }

    #[tokio::test]
    async fn missing_path_is_rejected() {
        let err = load(Path::new("/nonexistent/module")).await.unwrap_err();
        assert!(matches!(err, AgentError::Module(_)));
    }
}
