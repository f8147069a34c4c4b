//! Typed HTTP gateway for the TaskMaster REST API.
//!
//! One `ApiClient` owns the HTTP connection pool, the base URL and the
//! bearer token for the session. The token is ordinary state on the client,
//! threaded in at construction or set after sign-in.
//!
//! Every endpoint returns a parsed record on 2xx and an `ApiError` carrying
//! the status and response body otherwise.

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::fields::{TaskPriority, TaskStatus};
use crate::project::{Project, ProjectCodeRequest, ProjectCreateRequest, ProjectUpdateRequest};
use crate::task::{
    Task, TaskAssignRequest, TaskCreateRequest, TaskStatusUpdateRequest, TaskUpdateRequest,
};
use crate::user::{
    LoginRequest, LoginResponse, Notification, SignUpRequest, User, UserUpdateRequest,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for one API server and (optionally) one signed-in session.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Install the session token obtained from sign-in.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn expect_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let resp = self.with_auth(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(resp.json::<T>().await?)
    }

    async fn expect_empty(&self, req: RequestBuilder) -> ApiResult<()> {
        let resp = self.with_auth(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!("GET {path}");
        self.expect_json(self.http.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        debug!("POST {path}");
        self.expect_json(self.http.post(self.url(path)).json(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        debug!("PUT {path}");
        self.expect_json(self.http.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        debug!("DELETE {path}");
        self.expect_empty(self.http.delete(self.url(path))).await
    }

    // ---- authentication ----

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("authentication/sign-in", &body).await
    }

    pub async fn sign_up(&self, body: &SignUpRequest) -> ApiResult<User> {
        self.post("authentication/sign-up", body).await
    }

    // ---- users ----

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        self.get("users").await
    }

    pub async fn update_user(&self, body: &UserUpdateRequest) -> ApiResult<User> {
        self.put("users", body).await
    }

    pub async fn user_by_id(&self, user_id: i64) -> ApiResult<User> {
        self.get(&format!("users/{user_id}")).await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.delete(&format!("users/{user_id}")).await
    }

    pub async fn user_by_email(&self, email: &str) -> ApiResult<User> {
        self.get(&format!("users/email/{email}")).await
    }

    // ---- projects ----

    pub async fn projects(&self) -> ApiResult<Vec<Project>> {
        self.get("projects").await
    }

    pub async fn create_project(&self, body: &ProjectCreateRequest) -> ApiResult<Project> {
        self.post("projects", body).await
    }

    pub async fn project(&self, project_id: i64) -> ApiResult<Project> {
        self.get(&format!("projects/{project_id}")).await
    }

    pub async fn update_project(&self, id: i64, body: &ProjectUpdateRequest) -> ApiResult<Project> {
        self.put(&format!("projects/{id}"), body).await
    }

    pub async fn delete_project(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("projects/{id}")).await
    }

    pub async fn set_project_code(&self, project_id: i64, code: &str) -> ApiResult<Project> {
        let body = ProjectCodeRequest {
            code: code.to_string(),
        };
        self.put(&format!("projects/{project_id}/code"), &body).await
    }

    pub async fn projects_by_member(&self, member_id: i64) -> ApiResult<Vec<Project>> {
        self.get(&format!("projects/member/{member_id}")).await
    }

    pub async fn projects_by_leader(&self, leader_id: i64) -> ApiResult<Vec<Project>> {
        self.get(&format!("projects/leader/{leader_id}")).await
    }

    pub async fn join_project(&self, key: &str) -> ApiResult<Project> {
        self.get(&format!("projects/join/{key}")).await
    }

    pub async fn remove_member(&self, project_id: i64, member_id: i64) -> ApiResult<()> {
        self.delete(&format!("projects/{project_id}/members/{member_id}")).await
    }

    // ---- tasks ----

    pub async fn tasks(&self) -> ApiResult<Vec<Task>> {
        self.get("tasks").await
    }

    pub async fn create_task(&self, body: &TaskCreateRequest) -> ApiResult<Task> {
        self.post("tasks", body).await
    }

    pub async fn task(&self, task_id: i64) -> ApiResult<Task> {
        self.get(&format!("tasks/{task_id}")).await
    }

    pub async fn update_task(&self, task_id: i64, body: &TaskUpdateRequest) -> ApiResult<Task> {
        self.put(&format!("tasks/{task_id}"), body).await
    }

    pub async fn delete_task(&self, task_id: i64) -> ApiResult<()> {
        self.delete(&format!("tasks/{task_id}")).await
    }

    pub async fn assign_task(&self, task_id: i64, user_id: i64) -> ApiResult<Task> {
        self.put(&format!("tasks/{task_id}/assign"), &TaskAssignRequest { user_id }).await
    }

    pub async fn unassign_task(&self, task_id: i64, user_id: i64) -> ApiResult<Task> {
        self.put(&format!("tasks/{task_id}/unassign"), &TaskAssignRequest { user_id }).await
    }

    pub async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> ApiResult<Task> {
        self.put(
            &format!("tasks/{task_id}/status"),
            &TaskStatusUpdateRequest { status },
        )
        .await
    }

    pub async fn tasks_by_user(&self, user_id: i64) -> ApiResult<Vec<Task>> {
        self.get(&format!("tasks/user/{user_id}")).await
    }

    pub async fn tasks_by_project(&self, project_id: i64) -> ApiResult<Vec<Task>> {
        self.get(&format!("tasks/project/{project_id}")).await
    }

    pub async fn tasks_by_project_and_user(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> ApiResult<Vec<Task>> {
        self.get(&format!("tasks/project/{project_id}/user/{user_id}")).await
    }

    pub async fn tasks_by_project_and_status(
        &self,
        project_id: i64,
        status: TaskStatus,
    ) -> ApiResult<Vec<Task>> {
        self.get(&format!(
            "tasks/project/{project_id}/status/{}",
            status.wire_label()
        ))
        .await
    }

    pub async fn tasks_by_project_and_priority(
        &self,
        project_id: i64,
        priority: TaskPriority,
    ) -> ApiResult<Vec<Task>> {
        self.get(&format!(
            "tasks/project/{project_id}/priority/{}",
            priority.wire_label()
        ))
        .await
    }

    // ---- notifications ----

    pub async fn my_notifications(&self) -> ApiResult<Vec<Notification>> {
        self.get("notifications/me").await
    }
}
