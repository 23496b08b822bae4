use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod alert;
mod config;
mod daemon;
mod error;
mod pomodoro;
mod rpc;

use config::{Cli, ClientCommand};
use error::{ConfigError, DaemonError};

fn init_logging(filter: &str) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|e| ConfigError::InvalidLogFilter {
        filter: filter.to_string(),
        message: e.to_string(),
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
    Ok(())
}

async fn run_client(cli: &Cli, command: ClientCommand) -> Result<(), DaemonError> {
    let result = rpc::client::call(&cli.endpoint(), command.method()).await?;
    match result {
        Value::Array(parts) => {
            for part in parts {
                match part {
                    Value::String(s) => println!("{}", s),
                    other => println!("{}", other),
                }
            }
        }
        Value::Null => println!("ok"),
        other => println!("{}", other),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Some(command) => run_client(&cli, command).await,
        None => daemon::run(cli.daemon_config()).await,
    };

    exit_status(result)
}

/// Log a fatal error once and turn it into the process exit status.
fn exit_status(result: Result<(), DaemonError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
