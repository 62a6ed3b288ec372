//! Declarative request descriptions and their translation into HTTP parts.
//!
//! A [`RequestSpec`] names a method, a verb and a path template such as
//! `rest/api/2/comment/:commentId/properties/:propertyKey`. Preparing it
//! substitutes the placeholders from the options and splits what is left into
//! a query string or a JSON body.

use std::fmt;

use reqwest::Method;
use serde_json::{Map, Value};

use super::error::{ApiError, Result};

/// Option key that carries the caller's token. Never forwarded to JIRA.
pub const TOKEN_FIELD: &str = "token";

/// HTTP verbs used by JIRA resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    /// The `reqwest` method for this verb.
    pub fn as_method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Head => Method::HEAD,
            HttpVerb::Options => Method::OPTIONS,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
        }
    }

    /// Read-style verbs send leftover options as query parameters instead of
    /// a body.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            HttpVerb::Get | HttpVerb::Head | HttpVerb::Options | HttpVerb::Delete
        )
    }

    /// The upper-case verb name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound API call, described declaratively.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// The resource method name, used for logging.
    pub method_name: String,
    /// The HTTP verb.
    pub verb: HttpVerb,
    /// Path relative to the base URL, with `:name` placeholders.
    pub path_template: String,
    /// Caller options: placeholder values, body/query data and `token`.
    pub options: Map<String, Value>,
    /// Refuse the call with a 401 when no session can be resolved.
    pub token_required: bool,
    /// Skip authentication entirely.
    pub ignore_auth: bool,
    /// Option whose value becomes the whole request body.
    pub body_field: Option<String>,
}

impl RequestSpec {
    /// Create a spec that requires a token.
    pub fn new(
        method_name: impl Into<String>,
        verb: HttpVerb,
        path_template: impl Into<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            verb,
            path_template: path_template.into(),
            options: Map::new(),
            token_required: true,
            ignore_auth: false,
            body_field: None,
        }
    }

    /// Set the caller options.
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    /// Mark the call as unauthenticated, e.g. the login endpoint itself.
    pub fn ignore_auth(mut self) -> Self {
        self.ignore_auth = true;
        self.token_required = false;
        self
    }

    /// Proceed without an `Authorization` header when no session resolves.
    pub fn token_optional(mut self) -> Self {
        self.token_required = false;
        self
    }

    /// Send the value of `field` as the request body.
    pub fn with_body_field(mut self, field: impl Into<String>) -> Self {
        self.body_field = Some(field.into());
        self
    }

    /// The non-empty `token` option supplied with the call, if any.
    pub fn explicit_token(&self) -> Option<&str> {
        self.options
            .get(TOKEN_FIELD)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Substitute placeholders and split the remaining options.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingPathParameter` if a placeholder has no value.
    pub fn prepare(&self) -> Result<PreparedRequest> {
        let mut options = self.options.clone();
        let token = self.explicit_token().map(str::to_string);
        options.remove(TOKEN_FIELD);

        let path = substitute_path(&self.path_template, &mut options)?;

        let mut body = None;
        if let Some(field) = &self.body_field {
            body = options.remove(field).filter(|v| !v.is_null());
        }

        let mut query = Vec::new();
        if self.verb.is_read() || self.body_field.is_some() {
            query = query_pairs(&options);
        } else if !options.is_empty() {
            body = Some(Value::Object(options));
        }

        Ok(PreparedRequest { path, query, body, token })
    }
}

/// The HTTP parts of a [`RequestSpec`], before auth and base URL are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Path with placeholders substituted.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Token supplied with the call, if any.
    pub token: Option<String>,
}

/// Replace every `:name` placeholder with the URL-encoded option value.
///
/// Consumed options are removed from `options`.
fn substitute_path(template: &str, options: &mut Map<String, Value>) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        path.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());

        if name_len == 0 {
            path.push(':');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        let value = options
            .remove(name)
            .and_then(|v| scalar_to_string(&v))
            .ok_or_else(|| ApiError::MissingPathParameter(name.to_string()))?;
        path.push_str(&urlencoding::encode(&value));
        rest = &after[name_len..];
    }

    path.push_str(rest);
    Ok(path)
}

/// Turn leftover options into query pairs; arrays repeat the key.
fn query_pairs(options: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in options {
        match value {
            Value::Array(items) => {
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_to_string)
                        .map(|v| (key.clone(), v)),
                );
            }
            other => {
                if let Some(v) = scalar_to_string(other) {
                    pairs.push((key.clone(), v));
                }
            }
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
