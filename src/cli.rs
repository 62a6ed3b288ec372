//! Command-line front end.
//!
//! Drives login, logout and resource calls against a configured profile and
//! prints JSON results on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::api::{auth, Args, Credential, JiraConnector, TOKEN_FIELD};
use crate::config::{Config, Profile};
use crate::error::{AppError, Result};
use crate::resource;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "jira-connector", version, about = "Call the JIRA REST API with signed session tokens")]
pub struct Cli {
    /// Profile to use instead of the configured default.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Secret used to encrypt session identifiers and sign tokens.
    #[arg(long, env = "JIRA_CONNECTOR_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,

    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also log to stderr; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the issued token for the profile.
    Login {
        /// User name; defaults to the profile's user name.
        #[arg(long)]
        username: Option<String>,
        /// Password.
        #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the stored token.
    Logout,
    /// Call a resource method, e.g. `call ProjectRole findById projectIdOrKey=PROJ id=10002`.
    Call {
        /// Resource name.
        resource: String,
        /// Method name.
        method: String,
        /// Arguments as `key=value`; values are parsed as JSON when possible.
        #[arg(value_parser = parse_key_value)]
        args: Vec<(String, Value)>,
        /// Token to use instead of the stored one.
        #[arg(long)]
        token: Option<String>,
    },
    /// List the models a host framework would register.
    Resources,
}

/// Parse `key=value`, reading the value as JSON and falling back to a string.
fn parse_key_value(input: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", input))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Run a parsed command and return the JSON to print.
pub async fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let profile_name = cli.profile.as_deref();
    let secret = cli.secret.clone().unwrap_or_default();

    match cli.command {
        Command::Login { username, password } => {
            let (profile, connector) = connect(&config, profile_name, secret)?;
            let username = username
                .or_else(|| profile.username.clone())
                .ok_or_else(|| AppError::other("No user name given and none in the profile."))?;
            let result = connector.login(Credential::new(username, password)).await?;
            auth::store_token(&profile.name, result.token())?;
            info!(profile = %profile.name, "Stored session token");
            to_output(&result)
        }
        Command::Logout => {
            let (profile, connector) = connect(&config, profile_name, secret)?;
            let username = profile.username.clone().unwrap_or_default();
            let (tx, rx) = oneshot::channel();
            connector
                .logout_with(
                    &username,
                    Box::new(move |outcome| {
                        let _ = tx.send(outcome);
                    }),
                )
                .await;
            let body = rx
                .await
                .map_err(|_| AppError::other("Logout did not complete."))??;
            if let Err(e) = auth::delete_token(&profile.name) {
                warn!("No stored token removed: {}", e);
            }
            to_output(&body)
        }
        Command::Call {
            resource: resource_name,
            method,
            args,
            token,
        } => {
            let definition = resource::find(&resource_name)
                .ok_or_else(|| AppError::other(format!("Unknown resource '{}'.", resource_name)))?;
            let (_, connector) = connect(&config, profile_name, secret)?;
            let mut options: Map<String, Value> = args.into_iter().collect();
            if let Some(token) = token {
                options.insert(TOKEN_FIELD.to_string(), Value::String(token));
            }
            let body = connector
                .invoke(definition, &method, Args::Named(options))
                .await?;
            to_output(&body)
        }
        Command::Resources => {
            let prefix = config
                .resolve_profile(profile_name)
                .map(|p| p.prefix.clone())
                .unwrap_or_else(|_| "Jira".to_string());
            to_output(&resource::models(&prefix))
        }
    }
}

/// Resolve the profile and build a connector for it.
///
/// The stored token for the profile, if any, becomes the default token.
fn connect(config: &Config, name: Option<&str>, secret: String) -> Result<(Profile, JiraConnector)> {
    let profile = config.resolve_profile(name)?.clone();
    let settings = profile.connector_settings(
        secret,
        auth::get_token(&profile.name),
        config.settings.token_ttl_secs,
    );
    let connector = JiraConnector::new(settings)?;
    Ok((profile, connector))
}

fn to_output<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::other(format!("Could not format output: {}", e)))
}
