use std::collections::BTreeMap;
use std::path::Path;

use crate::error::AgentError;
use crate::loader;
use crate::module::ExternalModule;

/// All modules found at agent start-up, keyed by name.
///
/// Built once from the configured modules directory and read-only after
/// that. A module that fails to load is skipped with a warning rather than
/// taking the whole agent down with it.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ExternalModule>,
}

impl ModuleRegistry {
    /// Load every regular file in `dir` as a module.
    pub async fn load_dir(dir: &Path) -> Result<Self, AgentError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AgentError::Module(format!(
                "cannot read modules directory '{}': {e}",
                dir.display()
            ))
        })?;

        let mut modules = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AgentError::Module(format!(
                    "cannot read modules directory '{}': {e}",
                    dir.display()
                ))
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match loader::load(&path).await {
                Ok(module) => {
                    modules.insert(module.name().to_string(), module);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping module: {e}");
                }
            }
        }
        Ok(ModuleRegistry { modules })
    }

    pub fn get(&self, name: &str) -> Option<&ExternalModule> {
        self.modules.get(name)
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
