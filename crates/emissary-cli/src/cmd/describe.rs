use std::path::Path;

use anyhow::Result;
use serde_json::json;

pub async fn run(config: Option<&Path>, module: &str, json_out: bool) -> Result<()> {
    let config = super::load_config(config)?;
    let module = super::resolve_module(&config, module).await?;

    if json_out {
        let actions: Vec<_> = module.action_names().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "module": module.name(),
                "path": module.path(),
                "actions": actions,
            }))?
        );
    } else {
        println!("{} ({})", module.name(), module.path().display());
        for name in module.action_names() {
            println!("  {name}");
        }
    }
    Ok(())
}
