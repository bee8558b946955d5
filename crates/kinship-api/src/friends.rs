use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use kinship_core::friendships;
use kinship_types::api::Claims;
use kinship_types::models::Friendship;
use kinship_types::outcome::FriendshipOutcome;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn list_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| {
        friendships::find_friendships_by_username(s.store(), &claims.sub)
    })
    .await?;

    Ok(Json(found))
}

pub async fn friendship_status(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let friendship = blocking(&state, move |s| {
        friendships::check_friendship_status(s.store(), &claims.sub, &username)
    })
    .await?
    .ok_or(ApiError::NotFound("Friendship"))?;

    Ok(Json(friendship))
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let friendship = Friendship::new(claims.sub.as_str(), username.as_str());

    let outcome = blocking(&state, move |s| {
        friendships::add_friendship(s.store(), &claims.sub, &username)
    })
    .await?;

    match outcome {
        FriendshipOutcome::Added => Ok((StatusCode::CREATED, Json(friendship))),
        FriendshipOutcome::AlreadyFriends => Err(ApiError::AlreadyFriends),
        FriendshipOutcome::UserMissing => Err(ApiError::NotFound("User")),
        FriendshipOutcome::SelfFriendship => Err(ApiError::SelfFriendship),
        FriendshipOutcome::StoreFailure => Err(ApiError::StoreFailure),
    }
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = blocking(&state, move |s| {
        friendships::remove_friendship(s.store(), &claims.sub, &username)
    })
    .await?;

    if !removed {
        return Err(ApiError::NotFound("Friendship"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Unfriends everyone. Succeeds even when there was nobody to remove.
pub async fn remove_all_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| {
        friendships::remove_user_friends(s.store(), &claims.sub)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
