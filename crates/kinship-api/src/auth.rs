use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};

use kinship_core::users;
use kinship_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use kinship_types::models::{NewUser, User};
use kinship_types::outcome::LoginOutcome;

use crate::error::ApiError;
use crate::state::{AppState, blocking};
use crate::validate;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate::register(&req)?;

    let new_user = NewUser {
        username: req.username,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        is_admin: req.is_admin,
    };

    // Hashing happens inside add_user, on the blocking pool
    let (added, new_user) = blocking(&state, move |s| {
        let added = users::add_user(s.store(), &s.credentials, &new_user);
        (added, new_user)
    })
    .await?;

    if !added {
        return Err(ApiError::RegisterFailed);
    }

    let user = User {
        username: new_user.username,
        password: String::new(),
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        is_admin: new_user.is_admin,
    };
    let token = issue_token(&state, &user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let outcome = blocking(&state, move |s| {
        users::login(s.store(), &s.credentials, &req.username, &req.password)
    })
    .await?;

    let user = match outcome {
        LoginOutcome::Success(user) => user,
        LoginOutcome::BlankCredentials => return Err(ApiError::BlankCredentials),
        LoginOutcome::InvalidCredentials => return Err(ApiError::LoginFailed),
        LoginOutcome::StoreFailure => return Err(ApiError::StoreFailure),
    };

    info!("{} logged in", user.username);
    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse { user, token }))
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    create_token(&state.jwt_secret, state.token_ttl, user).map_err(|e| {
        error!("Token encoding failed: {:#}", e);
        ApiError::Internal
    })
}

pub fn create_token(secret: &str, ttl: chrono::Duration, user: &User) -> anyhow::Result<String> {
    let expires = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("token ttl of {} overflows the expiry time", ttl))?;
    let exp = usize::try_from(expires.timestamp())
        .map_err(|_| anyhow::anyhow!("token expiry {} is before the epoch", expires))?;

    let claims = Claims {
        sub: user.username.clone(),
        is_admin: user.is_admin,
        exp,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn user(is_admin: bool) -> User {
        User {
            username: "ann".into(),
            password: String::new(),
            first_name: None,
            last_name: None,
            is_admin,
        }
    }

    #[test]
    fn token_carries_subject_and_admin_flag() {
        let token = create_token("secret", chrono::Duration::days(1), &user(true)).unwrap();
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap()
        .claims;

        assert_eq!(claims.sub, "ann");
        assert!(claims.is_admin);
        assert!(claims.exp > chrono::Utc::now().timestamp() as usize);
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        assert!(create_token("secret", chrono::Duration::days(100_000_000), &user(false)).is_err());
        assert!(create_token("secret", chrono::Duration::MAX, &user(false)).is_err());
    }
}
