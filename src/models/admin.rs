use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id_to_string;

/// Dashboard administrator as returned by `/admins`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(alias = "_id")]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
}

impl Admin {
    pub fn id_string(&self) -> String {
        id_to_string(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /admins/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<Admin>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Forwarded body of `POST /admins/register` from the users screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl RegisterAdmin {
    pub const REQUIRED: &'static [&'static str] = &["name", "email", "password"];
}

/// Self-service sign-up form. Forwarded as a `user` role account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRegistration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl PublicRegistration {
    pub const REQUIRED: &'static [&'static str] = &["firstname", "lastname", "email", "password"];

    pub fn into_backend_body(self) -> Value {
        serde_json::json!({
            "name": format!("{} {}", self.firstname, self.lastname),
            "email": self.email,
            "password": self.password,
            "role": "user",
            "status": "active"
        })
    }
}
