pub mod describe;
pub mod run;
pub mod status;

use std::path::Path;

use anyhow::{Context, Result};
use emissary_core::{loader, AgentConfig, ExternalModule};

pub fn load_config(path: Option<&Path>) -> Result<AgentConfig> {
    AgentConfig::load_or_default(path).context("failed to load configuration")
}

/// Resolve `module` as a filesystem path when it points at a file,
/// otherwise as a name inside the configured modules directory.
pub async fn resolve_module(config: &AgentConfig, module: &str) -> Result<ExternalModule> {
    let direct = Path::new(module);
    let path = if direct.is_file() {
        direct.to_path_buf()
    } else {
        config.modules_dir.join(module)
    };
    loader::load(&path)
        .await
        .with_context(|| format!("failed to load module '{module}'"))
}
