//! Comment properties: custom key/value data stored against a comment.

use serde_json::Value;

use super::{MethodDef, ResourceDefinition};
use crate::api::{Args, Callback, HttpVerb, JiraConnector, Result};

const DELETE_PROPERTY: MethodDef = MethodDef {
    name: "deleteProperty",
    verb: HttpVerb::Delete,
    path: "rest/api/2/comment/:commentId/properties/:propertyKey",
    params: &["commentId", "propertyKey", "token"],
    body_field: None,
};

const GET_PROPERTIES_KEYS: MethodDef = MethodDef {
    name: "getPropertiesKeys",
    verb: HttpVerb::Get,
    path: "rest/api/2/comment/:commentId/properties",
    params: &["commentId", "token"],
    body_field: None,
};

const GET_PROPERTY: MethodDef = MethodDef {
    name: "getProperty",
    verb: HttpVerb::Get,
    path: "rest/api/2/comment/:commentId/properties/:propertyKey",
    params: &["commentId", "propertyKey", "token"],
    body_field: None,
};

const SET_PROPERTY: MethodDef = MethodDef {
    name: "setProperty",
    verb: HttpVerb::Put,
    path: "rest/api/2/comment/:commentId/properties/:propertyKey",
    params: &["commentId", "propertyKey", "token", "value"],
    body_field: Some("value"),
};

pub static DEFINITION: ResourceDefinition = ResourceDefinition {
    name: "CommentProperties",
    public: true,
    methods: &[DELETE_PROPERTY, GET_PROPERTIES_KEYS, GET_PROPERTY, SET_PROPERTY],
};

/// Facade over the comment properties endpoints.
///
/// Positional arguments follow the parameter order listed on each method.
/// `token` keeps its slot after the path parameters; extra fields come after it.
#[derive(Debug, Clone, Copy)]
pub struct CommentProperties<'a> {
    connector: &'a JiraConnector,
}

impl<'a> CommentProperties<'a> {
    pub(crate) fn new(connector: &'a JiraConnector) -> Self {
        Self { connector }
    }

    async fn call(&self, method: &MethodDef, args: impl Into<Args>) -> Result<Value> {
        self.connector.dispatch(method.spec(args.into())).await
    }

    /// Remove a property from a comment.
    ///
    /// Parameters: `commentId`, `propertyKey`, `token`.
    pub async fn delete_property(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&DELETE_PROPERTY, args).await
    }

    /// List the property keys of a comment.
    ///
    /// Parameters: `commentId`, `token`.
    pub async fn get_properties_keys(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&GET_PROPERTIES_KEYS, args).await
    }

    /// Read one property of a comment.
    ///
    /// Parameters: `commentId`, `propertyKey`, `token`.
    pub async fn get_property(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&GET_PROPERTY, args).await
    }

    /// Set a property on a comment. `value` is sent as the request body.
    ///
    /// Parameters: `commentId`, `propertyKey`, `token`, `value`.
    pub async fn set_property(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&SET_PROPERTY, args).await
    }

    /// Call any method of this resource by name, reporting to `handler`.
    pub async fn call_with(&self, method: &str, args: impl Into<Args>, handler: Callback<Value>) {
        self.connector
            .invoke_with(&DEFINITION, method, args, handler)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::ApiError;
    use crate::config::ConnectorSettings;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn connector(transport: &Arc<MockTransport>) -> JiraConnector {
        JiraConnector::with_transport(
            ConnectorSettings::new("jira.example.com", "comment-secret"),
            transport.clone(),
        )
    }

    async fn token(connector: &JiraConnector, transport: &MockTransport) -> String {
        transport.respond(200, json!({"session": {"name": "JSESSIONID", "value": "x"}}));
        connector
            .login(Args::positional(["alice", "secret"]))
            .await
            .unwrap()
            .session
            .jwt
    }

    #[tokio::test]
    async fn test_get_property_url() {
        let transport = MockTransport::new();
        let connector = connector(&transport);
        let token = token(&connector, &transport).await;
        transport.respond(200, json!({"key": "k", "value": {"a": 1}}));

        let body = connector
            .comment_properties()
            .get_property(Args::positional(["10001", "k", token.as_str()]))
            .await
            .unwrap();

        assert_eq!(body["value"]["a"], 1);
        let request = transport.requests().pop().unwrap();
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(
            request.url,
            "https://jira.example.com/rest/api/2/comment/10001/properties/k"
        );
        assert!(request.query.is_empty());
        assert!(request.body.is_none());
        assert!(request.authorization.is_some());
    }

    #[tokio::test]
    async fn test_set_property_sends_value_as_body() {
        let transport = MockTransport::new();
        let connector = connector(&transport);
        let token = token(&connector, &transport).await;

        connector
            .comment_properties()
            .set_property(json!({
                "commentId": "10001",
                "propertyKey": "colour",
                "value": {"hex": "#ff0000"},
                "token": token,
            }))
            .await
            .unwrap();

        let request = transport.requests().pop().unwrap();
        assert_eq!(request.method, reqwest::Method::PUT);
        assert_eq!(request.body, Some(json!({"hex": "#ff0000"})));
    }

    #[tokio::test]
    async fn test_delete_property_without_token_refused() {
        let transport = MockTransport::new();
        let err = connector(&transport)
            .comment_properties()
            .delete_property(Args::positional(["10001", "k"]))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 401);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_call_with_unknown_method() {
        let transport = MockTransport::new();
        let seen = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&seen);

        connector(&transport)
            .comment_properties()
            .call_with(
                "nope",
                Args::default(),
                Box::new(move |outcome| {
                    *sink.lock().unwrap() = matches!(outcome, Err(ApiError::UnknownMethod(_)));
                }),
            )
            .await;

        assert!(*seen.lock().unwrap());
    }
}
