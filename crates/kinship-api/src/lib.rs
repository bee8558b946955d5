pub mod auth;
pub mod blog;
pub mod error;
pub mod friends;
pub mod messages;
pub mod middleware;
pub mod state;
pub mod users;
pub mod validate;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All HTTP routes. Everything except register and login sits behind
/// [`middleware::require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/me", get(users::me))
        .route("/users/{username}", get(users::get_user).delete(users::delete_user))
        .route("/friends", get(friends::list_friends).delete(friends::remove_all_friends))
        .route(
            "/friends/{username}",
            get(friends::friendship_status)
                .post(friends::add_friend)
                .delete(friends::remove_friend),
        )
        .route("/messages", get(messages::all_messages).post(messages::send_message))
        .route("/messages/sent", get(messages::sent_messages))
        .route("/messages/received", get(messages::received_messages))
        .route("/messages/{message_id}", get(messages::get_message))
        .route("/messages/{message_id}/read", post(messages::mark_read))
        .route("/messages/{message_id}/sent", delete(messages::delete_sent))
        .route("/messages/{message_id}/received", delete(messages::delete_received))
        .route("/blog", get(blog::list_entries).post(blog::create_entry))
        .route("/blog/search", get(blog::search_by_title))
        .route("/blog/authors/{username}", get(blog::entries_by_author))
        .route("/blog/{entry_id}", get(blog::get_entry).delete(blog::delete_entry))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
