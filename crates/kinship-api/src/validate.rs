//! Field limits for request bodies, checked before any store access.
//! Lengths are counted in characters, not bytes.

use kinship_types::api::{CreateBlogEntryRequest, RegisterRequest, SendMessageRequest};

use crate::error::ApiError;

pub const USERNAME_LEN: (usize, usize) = (3, 20);
pub const PASSWORD_MIN: usize = 8;
pub const NAME_MAX: usize = 30;
pub const SUBJECT_LEN: (usize, usize) = (1, 100);
pub const BODY_MAX: usize = 500;
pub const TITLE_LEN: (usize, usize) = (1, 150);
pub const CONTENT_MAX: usize = 600;

fn within(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

pub fn register(req: &RegisterRequest) -> Result<(), ApiError> {
    within("username", &req.username, USERNAME_LEN)?;
    if req.username.trim() != req.username {
        return Err(ApiError::Validation(
            "username must not start or end with whitespace".into(),
        ));
    }
    if req.password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::Validation(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    // Login treats a whitespace-only password as blank
    if req.password.trim().is_empty() {
        return Err(ApiError::Validation("password must not be blank".into()));
    }
    for (field, value) in [("first_name", &req.first_name), ("last_name", &req.last_name)] {
        if let Some(name) = value {
            within(field, name, (0, NAME_MAX))?;
        }
    }
    Ok(())
}

pub fn message(req: &SendMessageRequest) -> Result<(), ApiError> {
    within("subject", &req.subject, SUBJECT_LEN)?;
    within("body", &req.body, (0, BODY_MAX))
}

pub fn blog_entry(req: &CreateBlogEntryRequest) -> Result<(), ApiError> {
    within("title", &req.title, TITLE_LEN)?;
    within("content", &req.content, (0, CONTENT_MAX))
}
