//! Argument normalization shared by every resource method.
//!
//! Resource methods accept either positional values, matched against the
//! method's declared parameter names, or a named options object.

use serde_json::{Map, Value};

use super::types::Credential;

/// Arguments for a resource call.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    /// Values in declared parameter order.
    Positional(Vec<Value>),
    /// An options object, used as-is.
    Named(Map<String, Value>),
}

impl Args {
    /// Build positional arguments.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Args::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Build named arguments from key/value pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Args::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Normalize into an options map.
    ///
    /// Positional values are paired with `params` in order; null values and
    /// values beyond the declared parameters are dropped.
    pub fn into_options(self, params: &[&str]) -> Map<String, Value> {
        match self {
            Args::Named(options) => options,
            Args::Positional(values) => params
                .iter()
                .zip(values)
                .filter(|(_, v)| !v.is_null())
                .map(|(name, v)| (name.to_string(), v))
                .collect(),
        }
    }
}

impl Default for Args {
    fn default() -> Self {
        Args::Positional(Vec::new())
    }
}

impl From<Map<String, Value>> for Args {
    fn from(options: Map<String, Value>) -> Self {
        Args::Named(options)
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(options) => Args::Named(options),
            Value::Array(values) => Args::Positional(values),
            Value::Null => Args::default(),
            other => Args::Positional(vec![other]),
        }
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args::Positional(values)
    }
}

impl From<&Credential> for Args {
    fn from(credential: &Credential) -> Self {
        Args::named([
            ("username", credential.username.clone()),
            ("password", credential.password.clone()),
        ])
    }
}

impl From<Credential> for Args {
    fn from(credential: Credential) -> Self {
        Args::from(&credential)
    }
}
