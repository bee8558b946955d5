use crate::models::User;

/// Result of attempting to send a message. The checks run in a fixed order:
/// party existence, then friendship, then the insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Stored under the given store-generated id.
    Sent(i64),
    /// Both users exist but are not friends.
    NotFriends,
    /// The sender or the recipient does not exist.
    PartyMissing,
    /// The store failed somewhere along the way.
    StoreFailure,
}

impl SendOutcome {
    /// Legacy integer code: the id on success, `-1` not friends,
    /// `-2` missing party, `0` anything else.
    pub fn code(self) -> i64 {
        match self {
            Self::Sent(id) => id,
            Self::NotFriends => -1,
            Self::PartyMissing => -2,
            Self::StoreFailure => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(User),
    /// Username or password was empty; the store was not consulted.
    BlankCredentials,
    /// No user with that username/password combination.
    InvalidCredentials,
    StoreFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipOutcome {
    Added,
    AlreadyFriends,
    UserMissing,
    SelfFriendship,
    StoreFailure,
}
