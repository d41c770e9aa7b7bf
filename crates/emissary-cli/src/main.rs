mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "emissary",
    about = "Run and inspect emissary module actions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Agent config file (default: ./emissary.yaml when present)
    #[arg(long, global = true, env = "EMISSARY_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the actions a module declares
    Describe {
        /// Module name (resolved in modules_dir) or path to an executable
        module: String,
    },

    /// Execute an action and wait for its result
    Run {
        module: String,
        action: String,
        /// Action params as a JSON document
        #[arg(long, default_value = "{}")]
        params: String,
    },

    /// Dispatch an action without waiting for its result; prints the
    /// request id immediately, then stays attached until the status record
    /// is written
    Dispatch {
        module: String,
        action: String,
        #[arg(long, default_value = "{}")]
        params: String,
    },

    /// Show the status record for a dispatched request
    Status { request_id: String },

    /// Poll until a dispatched request reaches a terminal state
    Await {
        request_id: String,
        /// Stop polling after this many seconds (the action keeps running)
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Describe { module } => cmd::describe::run(config, &module, cli.json).await,
        Commands::Run {
            module,
            action,
            params,
        } => cmd::run::run(config, &module, &action, &params, cli.json).await,
        Commands::Dispatch {
            module,
            action,
            params,
        } => cmd::run::dispatch(config, &module, &action, &params).await,
        Commands::Status { request_id } => cmd::status::show(config, &request_id, cli.json),
        Commands::Await {
            request_id,
            timeout_secs,
        } => cmd::status::wait(config, &request_id, timeout_secs, cli.json).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
