use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kinship_types::api::ErrorResponse;
use tracing::error;

/// Error type for every handler.
///
/// The `Display` text becomes the `message` field of the JSON body, so it
/// must never carry store details. Those are logged where they happen.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error("Username and password are required")]
    BlankCredentials,
    #[error("No such username/password")]
    LoginFailed,
    #[error("Missing or invalid bearer token")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Username is not available")]
    RegisterFailed,
    #[error("Already friends")]
    AlreadyFriends,
    #[error("Cannot befriend yourself")]
    SelfFriendship,
    #[error("Sender and recipient are not friends")]
    NotFriends,
    #[error("Sender or recipient does not exist")]
    PartyMissing,
    #[error("The store could not complete the request")]
    StoreFailure,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Json(_)
            | Self::Query(_)
            | Self::BlankCredentials
            | Self::SelfFriendship => StatusCode::BAD_REQUEST,
            Self::LoginFailed | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::NotFriends => StatusCode::FORBIDDEN,
            Self::NotFound(_) | Self::PartyMissing => StatusCode::NOT_FOUND,
            Self::RegisterFailed | Self::AlreadyFriends => StatusCode::CONFLICT,
            Self::StoreFailure | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable token for the `error` field.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_field",
            Self::Json(_) | Self::Query(_) => "bad_request",
            Self::BlankCredentials => "blank_credentials",
            Self::LoginFailed => "login_failed",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::RegisterFailed => "register_failed",
            Self::AlreadyFriends => "already_friends",
            Self::SelfFriendship => "self_friendship",
            Self::NotFriends => "not_friends",
            Self::PartyMissing => "party_missing",
            Self::StoreFailure => "store_failure",
            Self::Internal => "internal_error",
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!("spawn_blocking join error: {}", e);
        Self::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.token().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failure_keeps_the_legacy_message() {
        let err = ApiError::LoginFailed;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "No such username/password");
    }

    #[test]
    fn send_failures_map_to_distinct_statuses() {
        assert_eq!(ApiError::NotFriends.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::PartyMissing.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::StoreFailure.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::NotFound("Message").to_string(), "Message not found");
    }
}
