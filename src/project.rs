//! Project record and request payloads.

use serde::{Deserialize, Serialize};

/// A project as returned by the project endpoints.
///
/// `key` is the human-readable join code members use to enter the project;
/// `status` is free text on this entity (unlike task status).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub project_id: i64,
    pub key: String,
    pub leader_id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub budget: f64,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

/// Payload for `POST /api/v1/projects`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub budget: f64,
    pub end_date: String,
}

/// Payload for `PUT /api/v1/projects/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub budget: f64,
    pub status: String,
    pub end_date: String,
}

/// Payload for `PUT /api/v1/projects/{projectId}/code`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCodeRequest {
    pub code: String,
}
