use std::sync::Arc;

use kinship_core::{Credentials, Store};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Box<dyn Store>,
    pub credentials: Credentials,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl AppStateInner {
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Runs store work off the async runtime. The closure gets the shared state,
/// so it only needs to own its request data.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    Ok(tokio::task::spawn_blocking(move || f(&state)).await?)
}
