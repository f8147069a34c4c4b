//! User and notification records, plus the authentication payloads.
//!
//! The backend is loose about the type of the project associations on a user:
//! depending on the endpoint they arrive as numbers or as numeric strings.
//! They are coerced to `i64` once, at deserialization, so every comparison
//! downstream is a plain integer equality.

use serde::{Deserialize, Deserializer, Serialize};

pub const ROLE_LEADER: &str = "ROLE_LEADER";
pub const ROLE_MEMBER: &str = "ROLE_MEMBER";

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub name: String,
    pub last_name: String,
    pub image_url: Option<String>,
    pub salary: Option<f64>,
    #[serde(
        default,
        alias = "projectResources",
        deserialize_with = "project_ids_from_mixed"
    )]
    pub project_ids: Vec<i64>,
}

impl User {
    /// "{name} {last_name}" as shown in member lists and statistics.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

/// Accept `[1, "2", ...]` and keep only entries that coerce to an integer.
fn project_ids_from_mixed<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect())
}

/// Users holding the member role who belong to the given project.
pub fn members_of_project(users: &[User], project_id: i64) -> Vec<&User> {
    users
        .iter()
        .filter(|u| u.roles.iter().any(|r| r == ROLE_MEMBER) && u.project_ids.contains(&project_id))
        .collect()
}

/// Split a free-form username into (name, last name).
///
/// The first whitespace-separated word becomes the name, the rest the last
/// name, with "Usuario" / "Nuevo" as fallbacks for missing parts.
pub fn split_username(username: &str) -> (String, String) {
    let mut parts = username.split_whitespace();
    let name = parts.next().unwrap_or("Usuario").to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() {
        "Nuevo".to_string()
    } else {
        rest.join(" ")
    };
    (name, last)
}

/// A notification addressed to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub sent_at: String,
}

/// Payload for `POST /api/v1/authentication/sign-in`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Payload for `POST /api/v1/authentication/sign-up`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl SignUpRequest {
    /// Self-service sign-up registers the account as a project leader.
    pub fn new_leader(name: String, last_name: String, email: String, password: String) -> Self {
        SignUpRequest {
            name,
            last_name,
            email,
            password,
            roles: vec![ROLE_LEADER.to_string()],
        }
    }
}

/// Payload for `PUT /api/v1/users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub name: String,
    pub last_name: String,
    pub image_url: Option<String>,
    pub salary: Option<f64>,
}
