use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use kinship_core::users;
use kinship_types::api::Claims;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| {
        users::find_user_by_username(s.store(), &claims.sub)
    })
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| users::find_user_by_username(s.store(), &username))
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user))
}

/// Users may delete themselves; admins may delete anyone.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = blocking(&state, move |s| {
        if claims.sub != username && !users::check_if_user_is_admin(s.store(), &claims.sub) {
            return Err(ApiError::Forbidden("Only admins can remove other users"));
        }
        Ok(users::remove_user(s.store(), &username))
    })
    .await??;

    if !removed {
        return Err(ApiError::NotFound("User"));
    }
    Ok(StatusCode::NO_CONTENT)
}
