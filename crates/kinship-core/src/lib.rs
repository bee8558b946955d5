//! Business rules for users, friendships, messages and blog entries.
//!
//! Every rule function is generic over the repository traits in [`repo`], so
//! the same logic runs against SQLite in production and [`memory::MemoryStore`]
//! in tests. Store errors never escape this layer: they are logged and turned
//! into the operation's failure value.

pub mod blog;
pub mod friendships;
pub mod memory;
pub mod messages;
pub mod repo;
pub mod users;

pub use repo::{BlogRepository, FriendshipRepository, MessageRepository, Store, UserRepository};
pub use users::Credentials;

use tracing::error;

/// Unwraps a store result, logging the failure and substituting the type's
/// empty value (`false`, `None`, empty `Vec`).
pub(crate) fn recover<T: Default>(operation: &'static str, result: anyhow::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        error!("Store failure in {}: {:#}", operation, e);
        T::default()
    })
}
