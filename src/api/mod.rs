//! JIRA API connector, token security and request dispatch.
//!
//! This module provides the interface for communicating with the JIRA REST API.

mod args;
pub mod auth;
mod callback;
mod client;
mod dispatch;
mod error;
mod security;
mod session;
#[cfg(test)]
pub(crate) mod testing;
mod transport;
mod types;

pub use args::Args;
pub use callback::{callback, settle, Callback};
pub use client::JiraConnector;
pub use dispatch::{HttpVerb, PreparedRequest, RequestSpec, TOKEN_FIELD};
pub use error::{ApiError, Result, NO_TOKEN_MESSAGE, TRANSPORT_FAILURE_STATUS};
pub use security::{TokenCodec, DEFAULT_TOKEN_TTL_SECS};
pub use session::{SessionResolver, SESSION_ID_FIELD};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, TransportResponse};
pub use types::{Credential, ErrorMessage, LoginResult, NormalizedError, Session};
