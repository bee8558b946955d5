use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use kinship_core::{messages, users};
use kinship_types::api::{Claims, SendMessageRequest, SendMessageResponse};
use kinship_types::outcome::SendOutcome;

use crate::error::ApiError;
use crate::state::{AppState, blocking};
use crate::validate;

/// The token subject is always the sender.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate::message(&req)?;

    let outcome = blocking(&state, move |s| {
        messages::send_message(s.store(), &claims.sub, &req.recipient, &req.subject, &req.body)
    })
    .await?;

    match outcome {
        SendOutcome::Sent(message_id) => {
            Ok((StatusCode::CREATED, Json(SendMessageResponse { message_id })))
        }
        SendOutcome::NotFriends => Err(ApiError::NotFriends),
        SendOutcome::PartyMissing => Err(ApiError::PartyMissing),
        SendOutcome::StoreFailure => Err(ApiError::StoreFailure),
    }
}

/// Every message in the store, deleted or not. Admins only.
pub async fn all_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| {
        if !users::check_if_user_is_admin(s.store(), &claims.sub) {
            return Err(ApiError::Forbidden("Only admins can list every message"));
        }
        Ok(messages::get_all_messages(s.store()))
    })
    .await??;

    Ok(Json(found))
}

pub async fn sent_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| {
        messages::get_sent_messages_for_user(s.store(), &claims.sub)
    })
    .await?;

    Ok(Json(found))
}

pub async fn received_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| {
        messages::get_received_messages_for_user(s.store(), &claims.sub)
    })
    .await?;

    Ok(Json(found))
}

/// Visible to either party, even after they soft-deleted it. Anyone else
/// gets the same 404 as for a missing id.
pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message = blocking(&state, move |s| messages::get_message_by_id(s.store(), message_id))
        .await?
        .filter(|m| m.sender == claims.sub || m.recipient == claims.sub)
        .ok_or(ApiError::NotFound("Message"))?;

    Ok(Json(message))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let marked = blocking(&state, move |s| {
        messages::mark_message_as_read(s.store(), message_id, &claims.sub)
    })
    .await?;

    no_content_or_missing(marked)
}

pub async fn delete_sent(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = blocking(&state, move |s| {
        messages::delete_message_for_sender(s.store(), message_id, &claims.sub)
    })
    .await?;

    no_content_or_missing(deleted)
}

pub async fn delete_received(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = blocking(&state, move |s| {
        messages::delete_message_for_recipient(s.store(), message_id, &claims.sub)
    })
    .await?;

    no_content_or_missing(deleted)
}

// The rule layer cannot tell "no such id" from "not your message"
fn no_content_or_missing(affected: bool) -> Result<StatusCode, ApiError> {
    if affected {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Message"))
    }
}
