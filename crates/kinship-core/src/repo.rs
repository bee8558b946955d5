use anyhow::Result;
use kinship_types::models::{BlogEntry, Friendship, Message, NewMessage, User};

pub trait UserRepository {
    fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// True only if the user exists and carries the admin flag.
    fn is_admin(&self, username: &str) -> Result<bool>;

    /// Fails on a duplicate username.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Returns whether a row was removed. The store must cascade the user's
    /// friendships, messages and blog entries.
    fn delete_user(&self, username: &str) -> Result<bool>;
}

pub trait FriendshipRepository {
    /// Returns `false` if the pair is already stored. Fails if either user is
    /// unknown.
    fn insert_friendship(&self, friendship: &Friendship) -> Result<bool>;

    fn delete_friendship(&self, friendship: &Friendship) -> Result<bool>;

    /// Removes every friendship involving `username`, returning how many.
    fn delete_friendships_of(&self, username: &str) -> Result<usize>;

    fn friendships_of(&self, username: &str) -> Result<Vec<Friendship>>;

    fn find_friendship(&self, friendship: &Friendship) -> Result<Option<Friendship>>;
}

pub trait MessageRepository {
    /// Stores the message unread and undeleted, returning the generated id.
    fn insert_message(&self, message: &NewMessage) -> Result<i64>;

    /// Ignores both deleted flags.
    fn find_message(&self, message_id: i64) -> Result<Option<Message>>;

    /// Newest first, excluding rows deleted for the sender.
    fn sent_messages(&self, sender: &str) -> Result<Vec<Message>>;

    /// Newest first, excluding rows deleted for the recipient.
    fn received_messages(&self, recipient: &str) -> Result<Vec<Message>>;

    fn all_messages(&self) -> Result<Vec<Message>>;

    /// The three state updates below match on id *and* party; they return
    /// whether a row matched, even if the flag was already set.
    fn mark_read(&self, message_id: i64, recipient: &str) -> Result<bool>;

    fn mark_deleted_for_sender(&self, message_id: i64, sender: &str) -> Result<bool>;

    fn mark_deleted_for_recipient(&self, message_id: i64, recipient: &str) -> Result<bool>;
}

pub trait BlogRepository {
    /// Returns the generated entry id. Fails if the author is unknown.
    fn insert_blog_entry(&self, username: &str, title: &str, content: &str) -> Result<i64>;

    fn delete_blog_entry(&self, entry_id: i64) -> Result<bool>;

    fn find_blog_entry(&self, entry_id: i64) -> Result<Option<BlogEntry>>;

    /// First match by ascending entry id.
    fn find_blog_entry_by_title(&self, title: &str) -> Result<Option<BlogEntry>>;

    /// Newest first.
    fn blog_entries_by_author(&self, username: &str) -> Result<Vec<BlogEntry>>;

    /// Newest first.
    fn all_blog_entries(&self) -> Result<Vec<BlogEntry>>;
}

/// Everything the request layer needs from a store, as one object-safe trait.
pub trait Store:
    UserRepository + FriendshipRepository + MessageRepository + BlogRepository + Send + Sync
{
}

impl<T> Store for T where
    T: UserRepository + FriendshipRepository + MessageRepository + BlogRepository + Send + Sync
{
}
