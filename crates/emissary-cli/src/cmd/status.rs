use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use emissary_core::{StatusRecord, StatusSpool};

pub fn show(config: Option<&Path>, request_id: &str, json_out: bool) -> Result<()> {
    let config = super::load_config(config)?;
    let spool = StatusSpool::new(&config.spool_dir);
    match spool.read(request_id)? {
        Some(record) => print_record(&record, json_out)?,
        None => println!("unknown request: {request_id}"),
    }
    Ok(())
}

pub async fn wait(
    config: Option<&Path>,
    request_id: &str,
    timeout_secs: u64,
    json_out: bool,
) -> Result<()> {
    let config = super::load_config(config)?;
    let spool = StatusSpool::new(&config.spool_dir);
    let outcome = spool
        .await_terminal(
            request_id,
            Duration::from_secs(timeout_secs),
            config.poll_interval(),
        )
        .await?;
    match outcome {
        Some(record) => print_record(&record, json_out)?,
        // Not an error: the action may simply still be running.
        None => println!("still running after {timeout_secs}s"),
    }
    Ok(())
}

fn print_record(record: &StatusRecord, json_out: bool) -> Result<()> {
    if json_out {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    match record {
        StatusRecord::Running => println!("running"),
        StatusRecord::Completed { result } => {
            println!("completed");
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        StatusRecord::Failed { error } => println!("failed: {error}"),
    }
    Ok(())
}
