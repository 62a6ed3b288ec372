//! JIRA connector implementation.
//!
//! This module provides the connector that turns [`RequestSpec`]s into HTTP
//! calls. It handles token resolution, `Authorization` header injection,
//! error normalization, and the login/logout session endpoints.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::args::Args;
use super::auth::{basic_header, session_identifier};
use super::callback::{settle, Callback};
use super::dispatch::{HttpVerb, RequestSpec};
use super::error::{ApiError, Result};
use super::security::TokenCodec;
use super::session::{SessionResolver, SESSION_ID_FIELD};
use super::transport::{OutboundRequest, ReqwestTransport, Transport};
use super::types::{Credential, LoginResult, NormalizedError, Session};
use crate::config::ConnectorSettings;
use crate::resource::{self, CommentProperties, ModelRegistration, ProjectRole, ResourceDefinition};

/// Path of JIRA's cookie-session endpoint.
const SESSION_PATH: &str = "rest/auth/1/session";

/// The JIRA connector.
///
/// Owns its settings, token codec and transport for its whole lifetime.
/// Every operation is an async fn with a `_with` twin that reports the
/// outcome to a [`Callback`] instead.
#[derive(Debug, Clone)]
pub struct JiraConnector {
    /// The HTTP transport.
    transport: Arc<dyn Transport>,
    /// The base URL for the JIRA instance.
    base_url: String,
    /// Token selection and verification.
    resolver: SessionResolver,
    /// The settings the connector was built from.
    settings: ConnectorSettings,
}

impl JiraConnector {
    /// Create a connector using the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: ConnectorSettings) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    /// Create a connector with an explicit transport.
    #[instrument(skip_all, fields(name = %settings.name, host = %settings.host))]
    pub fn with_transport(settings: ConnectorSettings, transport: Arc<dyn Transport>) -> Self {
        let base_url = normalize_base_url(&settings.base_url());
        let codec = TokenCodec::new(settings.secret.clone(), settings.token_ttl_secs);
        let resolver = SessionResolver::new(codec, settings.default_token.clone());

        info!(base_url = %base_url, "Created JIRA connector");
        Self {
            transport,
            base_url,
            resolver,
            settings,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the settings this connector was built from.
    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    /// Get the token codec.
    pub fn codec(&self) -> &TokenCodec {
        self.resolver.codec()
    }

    /// Get the session resolver.
    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    /// Execute one API call described by `spec`.
    ///
    /// Resolves with the raw response body. Exactly one HTTP request is made,
    /// or none if the call is refused locally.
    ///
    /// # Errors
    ///
    /// - `ApiError::Remote` with status 401 if a token is required but none
    ///   resolves to a session
    /// - `ApiError::MissingPathParameter` if a placeholder has no value; the
    ///   token is checked first
    /// - `ApiError::Transport` if no response was received
    /// - `ApiError::Remote` with the server's messages for non-2xx statuses
    #[instrument(skip_all, fields(method = %spec.method_name, verb = %spec.verb))]
    pub async fn dispatch(&self, spec: RequestSpec) -> Result<Value> {
        let authorization = self.resolve_authorization(&spec, spec.explicit_token())?;
        let prepared = spec.prepare()?;

        let request = OutboundRequest {
            method: spec.verb.as_method(),
            url: format!("{}/{}", self.base_url, prepared.path),
            query: prepared.query,
            authorization,
            body: prepared.body,
        };
        debug!(url = %request.url, authenticated = request.authorization.is_some(), "Sending request");

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!("Transport failure: {}", e);
            ApiError::Transport(e)
        })?;

        if !response.is_success() {
            debug!(status = response.status, "Error response body: {}", response.body);
            return Err(ApiError::Remote(NormalizedError::from_response(
                response.status,
                &response.body,
            )));
        }

        debug!(status = response.status, "Request succeeded");
        Ok(response.body)
    }

    /// Callback form of [`JiraConnector::dispatch`].
    pub async fn dispatch_with(&self, spec: RequestSpec, handler: Callback<Value>) {
        settle(self.dispatch(spec), handler).await
    }

    /// Work out the `Authorization` header for a call.
    fn resolve_authorization(
        &self,
        spec: &RequestSpec,
        explicit_token: Option<&str>,
    ) -> Result<Option<String>> {
        if spec.ignore_auth {
            return Ok(None);
        }

        let session_id = self
            .resolver
            .get_token(explicit_token)
            .and_then(|token| self.resolver.get_session_id(token));

        match session_id {
            Ok(id) => Ok(Some(basic_header(&id))),
            Err(e) if spec.token_required => {
                warn!("Refusing call without a usable token: {}", e);
                Err(ApiError::unauthenticated())
            }
            Err(e) => {
                debug!("Proceeding without authorization: {}", e);
                Ok(None)
            }
        }
    }

    /// Log a user in and issue a signed token for the session.
    ///
    /// Accepts `Args::positional([username, password])` or a named
    /// `{username, password}` object. The transport session identifier is
    /// embedded in the token and never returned.
    #[instrument(skip_all)]
    pub async fn login(&self, args: impl Into<Args>) -> Result<LoginResult> {
        let args: Args = args.into();
        let options = args.into_options(&["username", "password"]);
        let credential = Credential::new(
            string_option(&options, "username"),
            string_option(&options, "password"),
        );
        debug!(username = %credential.username, "Logging in");

        let spec = RequestSpec::new("login", HttpVerb::Post, SESSION_PATH)
            .with_options(options)
            .ignore_auth();

        let body = self.dispatch(spec).await.map_err(|e| {
            warn!("Unable to login: {}", e);
            e
        })?;

        let result = self.issue_session(&credential, body)?;
        info!(username = %credential.username, "Logged in");
        Ok(result)
    }

    /// Callback form of [`JiraConnector::login`].
    pub async fn login_with(&self, args: impl Into<Args>, handler: Callback<LoginResult>) {
        settle(self.login(args), handler).await
    }

    /// Augment the login response with a signed token.
    fn issue_session(&self, credential: &Credential, body: Value) -> Result<LoginResult> {
        let mut extra = match body {
            Value::Object(map) => map,
            other => {
                return Err(ApiError::InvalidResponse(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let mut fields = match extra.remove("session") {
            Some(Value::Object(session)) => session,
            _ => {
                return Err(ApiError::InvalidResponse(
                    "login response has no session".to_string(),
                ))
            }
        };

        let codec = self.codec();
        let sealed = codec.encrypt(&session_identifier(credential))?;
        fields.insert(SESSION_ID_FIELD.to_string(), Value::String(sealed));
        fields.remove("jwt");
        let jwt = codec.generate_token(&fields)?;
        fields.remove(SESSION_ID_FIELD);

        Ok(LoginResult {
            session: Session { jwt, fields },
            extra,
        })
    }

    /// Log a user out.
    ///
    /// Not implemented against JIRA. Always fails with an invalid-token error;
    /// use [`JiraConnector::logout_with`] for the succeeding form.
    pub async fn logout(&self, username: &str) -> Result<Value> {
        debug!(username, "Logout not implemented");
        Err(ApiError::InvalidToken("invalid token".to_string()))
    }

    /// Callback form of logout. Always reports an empty object.
    pub async fn logout_with(&self, username: &str, handler: Callback<Value>) {
        debug!(username, "Logout not implemented");
        settle(async { Ok(json!({})) }, handler).await
    }

    /// Call a resource method by name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnknownMethod` if the resource has no such method.
    pub async fn invoke(
        &self,
        resource: &ResourceDefinition,
        method: &str,
        args: impl Into<Args>,
    ) -> Result<Value> {
        let def = resource.method(method)?;
        self.dispatch(def.spec(args.into())).await
    }

    /// Callback form of [`JiraConnector::invoke`].
    pub async fn invoke_with(
        &self,
        resource: &ResourceDefinition,
        method: &str,
        args: impl Into<Args>,
        handler: Callback<Value>,
    ) {
        settle(self.invoke(resource, method, args), handler).await
    }

    /// The comment properties resource.
    pub fn comment_properties(&self) -> CommentProperties<'_> {
        CommentProperties::new(self)
    }

    /// The project role resource.
    pub fn project_role(&self) -> ProjectRole<'_> {
        ProjectRole::new(self)
    }

    /// The models a host framework should register for this connector.
    pub fn models(&self) -> Vec<ModelRegistration> {
        resource::models(&self.settings.prefix)
    }
}

/// Read a string option, treating anything else as empty.
fn string_option(options: &Map<String, Value>, key: &str) -> String {
    match options.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::types::ErrorMessage;
    use crate::api::transport::TransportResponse;
    use std::sync::Mutex;

    const SECRET: &str = "connector-test-secret";

    fn connector(transport: &Arc<MockTransport>) -> JiraConnector {
        JiraConnector::with_transport(
            ConnectorSettings::new("jira.example.com", SECRET),
            transport.clone(),
        )
    }

    fn login_body() -> Value {
        json!({
            "session": {"name": "JSESSIONID", "value": "6E3487971234567896704A9EB4AE501F"},
            "loginInfo": {"failedLoginCount": 0, "loginCount": 12}
        })
    }

    async fn logged_in_token(transport: &Arc<MockTransport>) -> String {
        transport.respond(200, login_body());
        let result = connector(transport)
            .login(Args::positional(["alice", "secret"]))
            .await
            .unwrap();
        result.session.jwt
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://jira.example.com/"),
            "https://jira.example.com"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("https://jira.example.com///"),
            "https://jira.example.com"
        );
    }

    #[tokio::test]
    async fn test_login_issues_jwt_without_session_id() {
        let transport = MockTransport::new();
        transport.respond(200, login_body());

        let result = connector(&transport)
            .login(Args::positional(["alice", "secret"]))
            .await
            .unwrap();

        assert!(!result.session.jwt.is_empty());
        assert!(!result.session.fields.contains_key("sessionId"));
        assert_eq!(result.session.fields["name"], "JSESSIONID");
        assert_eq!(result.extra["loginInfo"]["loginCount"], 12);

        let wire = serde_json::to_value(&result).unwrap();
        assert!(wire["session"].get("jwt").is_some());
        assert!(wire["session"].get("sessionId").is_none());
    }

    #[tokio::test]
    async fn test_login_request_shape() {
        let transport = MockTransport::new();
        transport.respond(200, login_body());

        connector(&transport)
            .login(Credential::new("alice", "secret"))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, reqwest::Method::POST);
        assert_eq!(request.url, "https://jira.example.com/rest/auth/1/session");
        assert_eq!(request.body, Some(json!({"username": "alice", "password": "secret"})));
        assert!(request.authorization.is_none());
    }

    #[tokio::test]
    async fn test_login_token_wraps_session_identifier() {
        let transport = MockTransport::new();
        let token = logged_in_token(&transport).await;

        let connector = connector(&transport);
        let session_id = connector.resolver().get_session_id(&token).unwrap();
        assert_eq!(session_id, "YWxpY2U6c2VjcmV0");

        let descriptor = connector.codec().verify_token(&token).unwrap();
        assert_eq!(descriptor["name"], "JSESSIONID");
        assert_ne!(descriptor["sessionId"], "YWxpY2U6c2VjcmV0");
    }

    #[tokio::test]
    async fn test_login_failure_propagates_remote_error() {
        let transport = MockTransport::new();
        transport.respond(401, json!({"errorMessages": ["Login failed"]}));

        let err = connector(&transport)
            .login(Args::positional(["alice", "wrong"]))
            .await
            .unwrap_err();

        assert_eq!(err.normalized().status_code, 401);
        assert_eq!(
            err.normalized().message,
            ErrorMessage::List(vec!["Login failed".to_string()])
        );
    }

    #[tokio::test]
    async fn test_login_without_session_is_invalid_response() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"unexpected": true}));

        let err = connector(&transport)
            .login(Args::positional(["alice", "secret"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_login_without_secret_fails() {
        let transport = MockTransport::new();
        transport.respond(200, login_body());
        let connector = JiraConnector::with_transport(
            ConnectorSettings::new("jira.example.com", ""),
            transport.clone(),
        );

        let err = connector
            .login(Args::positional(["alice", "secret"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Encryption(_)));
    }

    #[tokio::test]
    async fn test_login_with_callback() {
        let transport = MockTransport::new();
        transport.respond(200, login_body());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        connector(&transport)
            .login_with(
                Args::positional(["alice", "secret"]),
                Box::new(move |outcome| {
                    *sink.lock().unwrap() = Some(outcome.map(|r| r.session.jwt));
                }),
            )
            .await;

        let outcome = seen.lock().unwrap().take().unwrap();
        assert!(!outcome.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_required_without_token_makes_no_call() {
        let transport = MockTransport::new();
        let spec = RequestSpec::new("getProjectRoles", HttpVerb::Get, "rest/api/2/project/:key/role")
            .with_options(json!({"key": "PROJ"}).as_object().cloned().unwrap());

        let err = connector(&transport).dispatch(spec).await.unwrap_err();

        assert_eq!(err.normalized(), NormalizedError::text(401, "no token supplied"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_reported_before_missing_placeholder() {
        let transport = MockTransport::new();
        let spec = RequestSpec::new("findById", HttpVerb::Get, "rest/api/2/project/:key/role/:id")
            .with_options(json!({"key": "PROJ"}).as_object().cloned().unwrap());

        let err = connector(&transport).dispatch(spec).await.unwrap_err();

        assert_eq!(err.normalized(), NormalizedError::text(401, "no token supplied"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_placeholder_with_valid_token() {
        let transport = MockTransport::new();
        let token = logged_in_token(&transport).await;
        let spec = RequestSpec::new("findById", HttpVerb::Get, "rest/api/2/project/:key/role/:id")
            .with_options(json!({"key": "PROJ", "token": token}).as_object().cloned().unwrap());

        let err = connector(&transport).dispatch(spec).await.unwrap_err();

        assert!(matches!(err, ApiError::MissingPathParameter(ref name) if name == "id"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_token_with_token_required_makes_no_call() {
        let transport = MockTransport::new();
        let spec = RequestSpec::new("getProjectRoles", HttpVerb::Get, "rest/api/2/project")
            .with_options(json!({"token": "garbage"}).as_object().cloned().unwrap());

        let err = connector(&transport).dispatch(spec).await.unwrap_err();

        assert_eq!(err.status_code(), 401);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ignore_auth_sends_no_authorization() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"ok": true}));
        let spec = RequestSpec::new("serverInfo", HttpVerb::Get, "rest/api/2/serverInfo").ignore_auth();

        let body = connector(&transport).dispatch(spec).await.unwrap();

        assert_eq!(body, json!({"ok": true}));
        assert!(transport.requests()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_optional_token_proceeds_without_authorization() {
        let transport = MockTransport::new();
        transport.respond(200, Value::Null);
        let spec = RequestSpec::new("serverInfo", HttpVerb::Get, "rest/api/2/serverInfo")
            .token_optional();

        connector(&transport).dispatch(spec).await.unwrap();
        assert!(transport.requests()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_explicit_token_attaches_basic_header() {
        let transport = MockTransport::new();
        let token = logged_in_token(&transport).await;
        transport.respond(200, json!([]));

        let spec = RequestSpec::new(
            "getPropertiesKeys",
            HttpVerb::Get,
            "rest/api/2/comment/:commentId/properties",
        )
        .with_options(json!({"commentId": "10001", "token": token}).as_object().cloned().unwrap());

        connector(&transport).dispatch(spec).await.unwrap();

        let request = transport.requests().pop().unwrap();
        assert_eq!(request.authorization.as_deref(), Some("Basic YWxpY2U6c2VjcmV0"));
        assert_eq!(
            request.url,
            "https://jira.example.com/rest/api/2/comment/10001/properties"
        );
        assert!(request.query.is_empty());
    }

    #[tokio::test]
    async fn test_default_token_used_when_none_supplied() {
        let transport = MockTransport::new();
        let token = logged_in_token(&transport).await;
        transport.respond(200, json!({}));

        let connector = JiraConnector::with_transport(
            ConnectorSettings::new("jira.example.com", SECRET).with_default_token(token),
            transport.clone(),
        );
        let spec = RequestSpec::new("myself", HttpVerb::Get, "rest/api/2/myself");
        connector.dispatch(spec).await.unwrap();

        let request = transport.requests().pop().unwrap();
        assert_eq!(request.authorization.as_deref(), Some("Basic YWxpY2U6c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_not_found_normalized() {
        let transport = MockTransport::new();
        transport.respond(404, json!({"errorMessages": ["not found"]}));
        let spec = RequestSpec::new("myself", HttpVerb::Get, "rest/api/2/myself").ignore_auth();

        let err = connector(&transport).dispatch(spec).await.unwrap_err();
        assert_eq!(
            err.normalized(),
            NormalizedError {
                status_code: 404,
                message: ErrorMessage::List(vec!["not found".to_string()]),
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_surfaced() {
        let transport = MockTransport::new();
        transport.fail("connection refused");
        let spec = RequestSpec::new("myself", HttpVerb::Get, "rest/api/2/myself").ignore_auth();

        let err = connector(&transport).dispatch(spec).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_with_callback_receives_error() {
        let transport = MockTransport::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let spec = RequestSpec::new("myself", HttpVerb::Get, "rest/api/2/myself");

        connector(&transport)
            .dispatch_with(
                spec,
                Box::new(move |outcome| {
                    *sink.lock().unwrap() = Some(outcome.map_err(|e| e.normalized()));
                }),
            )
            .await;

        let outcome = seen.lock().unwrap().take().unwrap();
        assert_eq!(outcome.unwrap_err().status_code, 401);
    }

    #[tokio::test]
    async fn test_logout_promise_form_rejects() {
        let transport = MockTransport::new();
        let err = connector(&transport).logout("alice").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid token: invalid token");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_logout_callback_form_resolves_empty() {
        let transport = MockTransport::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        connector(&transport)
            .logout_with(
                "alice",
                Box::new(move |outcome| {
                    *sink.lock().unwrap() = Some(outcome.unwrap());
                }),
            )
            .await;

        assert_eq!(seen.lock().unwrap().take(), Some(json!({})));
    }

    #[tokio::test]
    async fn test_empty_success_body_returned_raw() {
        let transport = MockTransport::new();
        transport.push(Ok(TransportResponse::new(204, Value::Null)));
        let spec = RequestSpec::new("delete", HttpVerb::Delete, "rest/x").ignore_auth();

        assert_eq!(connector(&transport).dispatch(spec).await.unwrap(), Value::Null);
    }

    #[test]
    fn test_models_use_prefix() {
        let transport = MockTransport::new();
        let models = connector(&transport).models();
        assert!(models
            .iter()
            .any(|m| m.model_name == "JiraCommentProperties" && !m.data_source));
    }
}
