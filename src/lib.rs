//! jira-connector - a typed client for the JIRA REST API.
//!
//! A login exchanges a user name and password for a signed token. Every
//! later call unwraps that token to recover the Basic session identifier
//! JIRA expects, so the raw credential never reaches the caller.
//!
//! ```no_run
//! use jira_connector::api::{Args, JiraConnector};
//! use jira_connector::config::ConnectorSettings;
//!
//! # async fn demo() -> jira_connector::api::Result<()> {
//! let connector = JiraConnector::new(ConnectorSettings::new("jira.example.com", "secret"))?;
//! let login = connector.login(Args::positional(["alice", "password"])).await?;
//!
//! let roles = connector
//!     .project_role()
//!     .get_project_roles(Args::positional(["PROJ", login.token()]))
//!     .await?;
//! println!("{}", roles);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod resource;

pub use api::{ApiError, Args, JiraConnector, NormalizedError};
pub use config::ConnectorSettings;
