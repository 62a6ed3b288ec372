//! jira-connector - call the JIRA REST API from the terminal.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use jira_connector::cli::{self, Cli};
use jira_connector::error::AppError;
use jira_connector::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = match logging::init(cli.verbose) {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let code = match cli::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err, log_dir.as_deref());
            ExitCode::from(err.exit_code())
        }
    };

    tracing::info!("jira-connector shutting down");
    code
}

fn report(err: &AppError, log_dir: Option<&Path>) {
    tracing::error!("Command failed: {}", err);
    eprintln!("Error: {}", err.user_message());
    if let Some(action) = err.suggested_action() {
        eprintln!("{}", action);
    }
    if let AppError::Api(api) = err {
        if let Ok(json) = serde_json::to_string(&api.normalized()) {
            eprintln!("{}", json);
        }
    }
    if let Some(dir) = log_dir {
        eprintln!("Details were logged under {}", dir.display());
    }
}
