use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use emissary_core::{ActionRequest, StatusSpool};

fn build_request(module: &str, action: &str, params: &str) -> Result<ActionRequest> {
    let params: Value = serde_json::from_str(params).context("--params is not valid JSON")?;
    Ok(ActionRequest::new(json!({
        "module": module,
        "action": action,
        "params": params,
    })))
}

pub async fn run(
    config: Option<&Path>,
    module_arg: &str,
    action: &str,
    params: &str,
    json_out: bool,
) -> Result<()> {
    let config = super::load_config(config)?;
    let module = super::resolve_module(&config, module_arg).await?;
    let request = build_request(module.name(), action, params)?;

    let outcome = module.execute_action(action, &request).await?;

    if json_out {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "exit_code": outcome.exit_code,
                "result": outcome.result,
                "stderr": outcome.stderr,
            }))?
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    }
    Ok(())
}

pub async fn dispatch(
    config: Option<&Path>,
    module_arg: &str,
    action: &str,
    params: &str,
) -> Result<()> {
    let config = super::load_config(config)?;
    let module = super::resolve_module(&config, module_arg).await?;
    let spool = StatusSpool::new(&config.spool_dir);
    let request = build_request(module.name(), action, params)?;

    let handle = module.dispatch_action(action, &request, &spool).await?;

    // Print the id right away so callers can start polling from elsewhere,
    // then stay attached until the terminal record is written — the
    // completion handler lives in this process.
    println!("{}", handle.request_id());
    use std::io::Write as _;
    std::io::stdout().flush().ok();
    handle.wait().await;
    Ok(())
}
