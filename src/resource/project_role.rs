//! Project roles and their actors (users or groups).

use serde_json::Value;

use super::{MethodDef, ResourceDefinition};
use crate::api::{Args, Callback, HttpVerb, JiraConnector, Result};

const ADD_ACTOR_USERS: MethodDef = MethodDef {
    name: "addActorUsers",
    verb: HttpVerb::Post,
    path: "rest/api/2/project/:projectIdOrKey/role/:id",
    params: &["projectIdOrKey", "id", "token", "user", "group"],
    body_field: None,
};

const DELETE_ACTOR: MethodDef = MethodDef {
    name: "deleteActor",
    verb: HttpVerb::Delete,
    path: "rest/api/2/project/:projectIdOrKey/role/:id",
    params: &["projectIdOrKey", "id", "user", "group", "token"],
    body_field: None,
};

const FIND_BY_ID: MethodDef = MethodDef {
    name: "findById",
    verb: HttpVerb::Get,
    path: "rest/api/2/project/:projectIdOrKey/role/:id",
    params: &["projectIdOrKey", "id", "token"],
    body_field: None,
};

const GET_PROJECT_ROLES: MethodDef = MethodDef {
    name: "getProjectRoles",
    verb: HttpVerb::Get,
    path: "rest/api/2/project/:projectIdOrKey/role",
    params: &["projectIdOrKey", "token"],
    body_field: None,
};

const SET_ACTORS: MethodDef = MethodDef {
    name: "setActors",
    verb: HttpVerb::Put,
    path: "rest/api/2/project/:projectIdOrKey/role/:id",
    params: &["projectIdOrKey", "id", "data", "token"],
    body_field: Some("data"),
};

pub static DEFINITION: ResourceDefinition = ResourceDefinition {
    name: "ProjectRole",
    public: true,
    methods: &[
        ADD_ACTOR_USERS,
        DELETE_ACTOR,
        FIND_BY_ID,
        GET_PROJECT_ROLES,
        SET_ACTORS,
    ],
};

/// Facade over the project role endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ProjectRole<'a> {
    connector: &'a JiraConnector,
}

impl<'a> ProjectRole<'a> {
    pub(crate) fn new(connector: &'a JiraConnector) -> Self {
        Self { connector }
    }

    async fn call(&self, method: &MethodDef, args: impl Into<Args>) -> Result<Value> {
        self.connector.dispatch(method.spec(args.into())).await
    }

    /// Add users or groups to a project role.
    ///
    /// Parameters: `projectIdOrKey`, `id`, `token`, `user` (list), `group` (list).
    pub async fn add_actor_users(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&ADD_ACTOR_USERS, args).await
    }

    /// Remove a user or group from a project role.
    ///
    /// Parameters: `projectIdOrKey`, `id`, `user`, `group`, `token`.
    pub async fn delete_actor(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&DELETE_ACTOR, args).await
    }

    /// Get one role of a project.
    ///
    /// Parameters: `projectIdOrKey`, `id`, `token`.
    pub async fn find_by_id(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&FIND_BY_ID, args).await
    }

    /// List the roles of a project.
    ///
    /// Parameters: `projectIdOrKey`, `token`.
    pub async fn get_project_roles(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&GET_PROJECT_ROLES, args).await
    }

    /// Replace the actors of a project role.
    ///
    /// Parameters: `projectIdOrKey`, `id`, `data`, `token`. `data` is sent as
    /// the request body, e.g. `{"categorisedActors": {...}}`.
    pub async fn set_actors(&self, args: impl Into<Args>) -> Result<Value> {
        self.call(&SET_ACTORS, args).await
    }

    /// Call any method of this resource by name, reporting to `handler`.
    pub async fn call_with(&self, method: &str, args: impl Into<Args>, handler: Callback<Value>) {
        self.connector
            .invoke_with(&DEFINITION, method, args, handler)
            .await
    }
}
