use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};

use kinship_core::{blog, users};
use kinship_types::api::{Claims, CreateBlogEntryRequest, CreateBlogEntryResponse, TitleQuery};

use crate::error::ApiError;
use crate::state::{AppState, blocking};
use crate::validate;

pub async fn list_entries(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let entries = blocking(&state, |s| blog::find_all_blog_entries(s.store())).await?;
    Ok(Json(entries))
}

pub async fn entries_by_author(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = blocking(&state, move |s| {
        blog::find_blog_entries_by_author(s.store(), &username)
    })
    .await?;

    Ok(Json(entries))
}

/// Exact title match; the oldest entry wins when titles repeat.
pub async fn search_by_title(
    State(state): State<AppState>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let entry = blocking(&state, move |s| {
        blog::find_blog_entry_by_title(s.store(), &query.title)
    })
    .await?
    .ok_or(ApiError::NotFound("Blog entry"))?;

    Ok(Json(entry))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = blocking(&state, move |s| blog::find_blog_entry_by_id(s.store(), entry_id))
        .await?
        .ok_or(ApiError::NotFound("Blog entry"))?;

    Ok(Json(entry))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateBlogEntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate::blog_entry(&req)?;

    let entry_id = blocking(&state, move |s| {
        blog::add_blog_entry(s.store(), &claims.sub, &req.title, &req.content)
    })
    .await?
    .ok_or(ApiError::StoreFailure)?;

    Ok((StatusCode::CREATED, Json(CreateBlogEntryResponse { entry_id })))
}

/// Authors may delete their own entries; admins may delete any.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| {
        let entry = blog::find_blog_entry_by_id(s.store(), entry_id)
            .ok_or(ApiError::NotFound("Blog entry"))?;

        if entry.username != claims.sub && !users::check_if_user_is_admin(s.store(), &claims.sub) {
            return Err(ApiError::Forbidden("Only the author or an admin can delete this entry"));
        }

        if !blog::remove_blog_entry(s.store(), entry_id) {
            return Err(ApiError::NotFound("Blog entry"));
        }
        Ok(())
    })
    .await??;

    Ok(StatusCode::NO_CONTENT)
}
