use serde::{Deserialize, Serialize};

use crate::models::User;

// -- JWT Claims --

/// JWT claims issued at register/login and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder.
    pub sub: String,
    /// Admin flag at issue time, for clients only. Authorization checks the
    /// store instead.
    pub is_admin: bool,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message_id: i64,
}

// -- Blog --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBlogEntryRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateBlogEntryResponse {
    pub entry_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable token, e.g. `login_failed`.
    pub error: String,
    pub message: String,
}
