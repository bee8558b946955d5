use kinship_types::models::Friendship;
use kinship_types::outcome::FriendshipOutcome;
use tracing::{error, info};

use crate::recover;
use crate::repo::{FriendshipRepository, UserRepository};

/// Records a friendship between two existing users. Self-friendship is
/// refused here even though [`Friendship`] can represent it.
pub fn add_friendship<S>(store: &S, username1: &str, username2: &str) -> FriendshipOutcome
where
    S: UserRepository + FriendshipRepository + ?Sized,
{
    let friendship = Friendship::new(username1, username2);
    if friendship.is_self() {
        return FriendshipOutcome::SelfFriendship;
    }

    for username in [friendship.user1(), friendship.user2()] {
        match store.find_user(username) {
            Ok(Some(_)) => {}
            Ok(None) => return FriendshipOutcome::UserMissing,
            Err(e) => {
                error!("Store failure in add_friendship: {:#}", e);
                return FriendshipOutcome::StoreFailure;
            }
        }
    }

    match store.insert_friendship(&friendship) {
        Ok(true) => {
            info!("{} and {} are now friends", friendship.user1(), friendship.user2());
            FriendshipOutcome::Added
        }
        Ok(false) => FriendshipOutcome::AlreadyFriends,
        Err(e) => {
            error!("Store failure in add_friendship: {:#}", e);
            FriendshipOutcome::StoreFailure
        }
    }
}

pub fn remove_friendship<S>(store: &S, username1: &str, username2: &str) -> bool
where
    S: FriendshipRepository + ?Sized,
{
    let friendship = Friendship::new(username1, username2);
    recover("remove_friendship", store.delete_friendship(&friendship))
}

/// Drops every friendship `username` is part of. True if any were removed.
pub fn remove_user_friends<S>(store: &S, username: &str) -> bool
where
    S: FriendshipRepository + ?Sized,
{
    recover("remove_user_friends", store.delete_friendships_of(username)) > 0
}

pub fn find_friendships_by_username<S>(store: &S, username: &str) -> Vec<Friendship>
where
    S: FriendshipRepository + ?Sized,
{
    recover("find_friendships_by_username", store.friendships_of(username))
}

/// The friendship between the two users, if any. Argument order is irrelevant.
pub fn check_friendship_status<S>(store: &S, username1: &str, username2: &str) -> Option<Friendship>
where
    S: FriendshipRepository + ?Sized,
{
    let friendship = Friendship::new(username1, username2);
    recover("check_friendship_status", store.find_friendship(&friendship))
}
