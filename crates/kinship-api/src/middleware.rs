use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, error};

use kinship_core::UserRepository;
use kinship_types::api::Claims;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// Validates the bearer token and exposes its [`Claims`] as a request
/// extension. The token subject is the acting user for every protected route.
///
/// Tokens of deleted users are rejected. A username registered again after
/// deletion is not told apart from the original, so older tokens for it
/// still work until they expire.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    let subject = token_data.claims.sub.clone();
    let found = blocking(&state, move |s| s.store().find_user(&subject)).await?;
    match found {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!("Rejected token for missing user {}", token_data.claims.sub);
            return Err(ApiError::Unauthorized);
        }
        Err(e) => {
            error!("Store failure in require_auth: {:#}", e);
            return Err(ApiError::StoreFailure);
        }
    }

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
