use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use kinship_types::models::{NewUser, User};
use kinship_types::outcome::LoginOutcome;
use rand_core::OsRng;
use tracing::{debug, error, info, warn};

use crate::recover;
use crate::repo::UserRepository;

/// Argon2id password hashing. Hashes are stored as PHC strings, so the
/// parameters used at registration travel with each hash and verification
/// keeps working if the defaults change.
#[derive(Clone)]
pub struct Credentials {
    argon2: Argon2<'static>,
}

impl Credentials {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with an explicit memory cost (KiB) and iteration count.
    pub fn with_cost(m_cost: u32, t_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, 1, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            warn!("Stored password is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers a user. Returns `false` if the username is taken (checked
/// before the insert; the store's key is a second guard) or on any failure.
pub fn add_user<S>(store: &S, credentials: &Credentials, new_user: &NewUser) -> bool
where
    S: UserRepository + ?Sized,
{
    match store.find_user(&new_user.username) {
        Ok(Some(_)) => {
            debug!("Username {} already taken", new_user.username);
            return false;
        }
        Ok(None) => {}
        Err(e) => {
            error!("Store failure in add_user: {:#}", e);
            return false;
        }
    }

    let password = match credentials.hash(&new_user.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("{:#}", e);
            return false;
        }
    };

    let user = User {
        username: new_user.username.clone(),
        password,
        first_name: new_user.first_name.clone(),
        last_name: new_user.last_name.clone(),
        is_admin: new_user.is_admin,
    };

    match store.insert_user(&user) {
        Ok(()) => {
            info!("User {} registered", user.username);
            true
        }
        Err(e) => {
            error!("Store failure in add_user: {:#}", e);
            false
        }
    }
}

pub fn find_user_by_username<S>(store: &S, username: &str) -> Option<User>
where
    S: UserRepository + ?Sized,
{
    recover("find_user_by_username", store.find_user(username))
}

/// The user whose username matches exactly and whose password verifies.
pub fn find_user_by_credentials<S>(
    store: &S,
    credentials: &Credentials,
    username: &str,
    password: &str,
) -> Option<User>
where
    S: UserRepository + ?Sized,
{
    match login(store, credentials, username, password) {
        LoginOutcome::Success(user) => Some(user),
        _ => None,
    }
}

pub fn login<S>(store: &S, credentials: &Credentials, username: &str, password: &str) -> LoginOutcome
where
    S: UserRepository + ?Sized,
{
    if username.trim().is_empty() || password.trim().is_empty() {
        return LoginOutcome::BlankCredentials;
    }

    match store.find_user(username) {
        Ok(Some(user)) if credentials.verify(password, &user.password) => {
            LoginOutcome::Success(user)
        }
        Ok(_) => LoginOutcome::InvalidCredentials,
        Err(e) => {
            error!("Store failure in login: {:#}", e);
            LoginOutcome::StoreFailure
        }
    }
}

pub fn check_if_user_is_admin<S>(store: &S, username: &str) -> bool
where
    S: UserRepository + ?Sized,
{
    recover("check_if_user_is_admin", store.is_admin(username))
}

/// Deletes the user; the store cascades their friendships, messages and
/// blog entries. Returns whether anything was removed.
pub fn remove_user<S>(store: &S, username: &str) -> bool
where
    S: UserRepository + ?Sized,
{
    let removed = recover("remove_user", store.delete_user(username));
    if removed {
        info!("User {} removed", username);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn credentials() -> Credentials {
        Credentials::with_cost(256, 1).unwrap()
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: password.into(),
            first_name: Some("First".into()),
            last_name: Some("Last".into()),
            is_admin: false,
        }
    }

    #[test]
    fn hash_and_verify() {
        let creds = credentials();
        let hash = creds.hash("hunter2hunter").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(creds.verify("hunter2hunter", &hash));
        assert!(!creds.verify("hunter3hunter", &hash));
        assert!(!creds.verify("hunter2hunter", "plaintext"));
    }

    #[test]
    fn duplicate_username_is_rejected_without_touching_the_original() {
        let store = MemoryStore::new();
        let creds = credentials();
        assert!(add_user(&store, &creds, &new_user("ann", "first-password")));

        let mut again = new_user("ann", "second-password");
        again.is_admin = true;
        again.first_name = Some("Other".into());
        assert!(!add_user(&store, &creds, &again));

        let stored = find_user_by_username(&store, "ann").unwrap();
        assert_eq!(stored.first_name.as_deref(), Some("First"));
        assert!(!stored.is_admin);
        assert!(creds.verify("first-password", &stored.password));
    }

    #[test]
    fn password_is_never_stored_in_plaintext() {
        let store = MemoryStore::new();
        let creds = credentials();
        assert!(add_user(&store, &creds, &new_user("ann", "plain-password")));
        let stored = find_user_by_username(&store, "ann").unwrap();
        assert_ne!(stored.password, "plain-password");
    }

    #[test]
    fn login_matches_exact_username_and_password() {
        let store = MemoryStore::new();
        let creds = credentials();
        add_user(&store, &creds, &new_user("ann", "annspassword"));

        match login(&store, &creds, "ann", "annspassword") {
            LoginOutcome::Success(user) => assert_eq!(user.username, "ann"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            login(&store, &creds, "ann", "wrong-password"),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(
            login(&store, &creds, "Ann", "annspassword"),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(
            login(&store, &creds, "ghost", "annspassword"),
            LoginOutcome::InvalidCredentials
        );
        assert!(find_user_by_credentials(&store, &creds, "ann", "annspassword").is_some());
        assert!(find_user_by_credentials(&store, &creds, "ann", "nope-nope").is_none());
    }

    #[test]
    fn blank_credentials_short_circuit() {
        // An unavailable store would turn any lookup into StoreFailure.
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let creds = credentials();

        assert_eq!(login(&store, &creds, "", "pw"), LoginOutcome::BlankCredentials);
        assert_eq!(login(&store, &creds, "ann", "   "), LoginOutcome::BlankCredentials);
        assert_eq!(login(&store, &creds, "ann", "pw"), LoginOutcome::StoreFailure);
    }

    #[test]
    fn admin_check() {
        let store = MemoryStore::new();
        let creds = credentials();
        let mut admin = new_user("root", "rootpassword");
        admin.is_admin = true;
        add_user(&store, &creds, &admin);
        add_user(&store, &creds, &new_user("ann", "annspassword"));

        assert!(check_if_user_is_admin(&store, "root"));
        assert!(!check_if_user_is_admin(&store, "ann"));
        assert!(!check_if_user_is_admin(&store, "ghost"));
    }

    #[test]
    fn remove_user_reports_affected_rows() {
        let store = MemoryStore::new();
        let creds = credentials();
        add_user(&store, &creds, &new_user("ann", "annspassword"));

        assert!(remove_user(&store, "ann"));
        assert!(!remove_user(&store, "ann"));
        assert!(find_user_by_username(&store, "ann").is_none());
    }

    #[test]
    fn store_failure_reads_as_failure() {
        let store = MemoryStore::new();
        let creds = credentials();
        store.set_unavailable(true);

        assert!(!add_user(&store, &creds, &new_user("ann", "annspassword")));
        assert!(find_user_by_username(&store, "ann").is_none());
        assert!(!check_if_user_is_admin(&store, "ann"));
        assert!(!remove_user(&store, "ann"));
    }
}
