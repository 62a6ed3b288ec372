//! JIRA resources.
//!
//! Each resource is a static table of [`MethodDef`]s plus a thin typed facade
//! that forwards to [`JiraConnector::dispatch`](crate::api::JiraConnector::dispatch).

mod comment_properties;
mod project_role;

use serde::Serialize;

use crate::api::{ApiError, Args, HttpVerb, RequestSpec, Result};

pub use comment_properties::CommentProperties;
pub use project_role::ProjectRole;

/// One resource method: a fixed verb and path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDef {
    /// Method name as exposed to callers, e.g. `getProperty`.
    pub name: &'static str,
    /// The HTTP verb.
    pub verb: HttpVerb,
    /// Path template with `:name` placeholders.
    pub path: &'static str,
    /// Parameter names in positional order.
    pub params: &'static [&'static str],
    /// Parameter sent as the whole request body, if any.
    pub body_field: Option<&'static str>,
}

impl MethodDef {
    /// Build the request spec for a call with `args`.
    pub fn spec(&self, args: Args) -> RequestSpec {
        let spec = RequestSpec::new(self.name, self.verb, self.path)
            .with_options(args.into_options(self.params));
        match self.body_field {
            Some(field) => spec.with_body_field(field),
            None => spec,
        }
    }
}

/// A resource: a named group of methods.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceDefinition {
    /// Resource name, e.g. `CommentProperties`.
    pub name: &'static str,
    /// Whether a host framework should expose the model publicly.
    pub public: bool,
    /// The resource's methods.
    pub methods: &'static [MethodDef],
}

impl ResourceDefinition {
    /// Look up a method by name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnknownMethod` if there is no such method.
    pub fn method(&self, name: &str) -> Result<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ApiError::UnknownMethod(format!("{}.{}", self.name, name)))
    }
}

/// Every shipped resource.
pub static RESOURCES: &[&ResourceDefinition] = &[
    &comment_properties::DEFINITION,
    &project_role::DEFINITION,
];

/// Find a resource by name.
///
/// Matching ignores case, `-` and `_`, so `comment-properties` finds
/// `CommentProperties`.
pub fn find(name: &str) -> Option<&'static ResourceDefinition> {
    let wanted = fold_name(name);
    RESOURCES.iter().copied().find(|r| fold_name(r.name) == wanted)
}

fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// What a host framework needs to register one resource as a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRegistration {
    /// PascalCase of prefix + resource name.
    pub model_name: String,
    /// The resource name.
    pub resource_name: &'static str,
    /// Whether the model is public.
    pub public: bool,
    /// Always `false`: models are backed by the connector, not a data source.
    pub data_source: bool,
}

/// List model registrations for every resource.
pub fn models(prefix: &str) -> Vec<ModelRegistration> {
    RESOURCES
        .iter()
        .map(|r| ModelRegistration {
            model_name: pascal_case(&format!("{}{}", prefix, r.name)),
            resource_name: r.name,
            public: r.public,
            data_source: false,
        })
        .collect()
}

/// Upper-case the first letter of each word, dropping separators.
fn pascal_case(input: &str) -> String {
    input
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
