use std::sync::Arc;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    error::{AuthError, AuthResult},
    password,
    repo::UserRepo,
    repo_types::{InsertOutcome, NewUser, User},
};

pub(crate) const MAX_PASSWORD_BYTES: usize = 1024;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@-]{1,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub(crate) fn is_valid_password(password: &str) -> bool {
    !password.is_empty() && password.len() <= MAX_PASSWORD_BYTES
}

/// Maps usernames to stable user identifiers and checks passwords.
///
/// Argon2 work runs on the blocking pool and never under a storage lock.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepo>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepo>) -> Self {
        password::init_dummy_hash();
        Self { repo }
    }

    pub async fn register(&self, username: &str, plain: &str) -> AuthResult<Uuid> {
        let plain = plain.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .context("join hash_password task")??;

        let outcome = self
            .repo
            .insert(NewUser {
                id: Uuid::new_v4(),
                username: username.to_owned(),
                password_hash,
            })
            .await?;

        match outcome {
            InsertOutcome::Created(user) => {
                info!(user_id = %user.id, username = %user.username, "user registered");
                Ok(user.id)
            }
            InsertOutcome::Duplicate => {
                warn!(username = %username, "username already registered");
                Err(AuthError::DuplicateUser)
            }
        }
    }

    /// Unknown username and wrong password fail identically, at the same cost.
    pub async fn verify(&self, username: &str, plain: &str) -> AuthResult<Uuid> {
        // Nothing over the registration cap can match; keep it away from Argon2.
        if plain.len() > MAX_PASSWORD_BYTES {
            warn!(username = %username, "login rejected");
            debug!(len = plain.len(), "password over length cap");
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.repo.find_by_username(username).await?;
        let plain = plain.to_owned();

        let Some(user) = user else {
            tokio::task::spawn_blocking(move || password::verify_dummy(&plain))
                .await
                .context("join verify task")?;
            warn!(username = %username, "login rejected");
            debug!("unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
            .await
            .context("join verify task")??;

        if !ok {
            warn!(username = %username, "login rejected");
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user.id)
    }

    /// Resolves a token subject to a stored user; a missing user is `InvalidToken`.
    pub async fn require_user(&self, id: Uuid) -> AuthResult<User> {
        match self.repo.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %id, "token subject no longer exists");
                Err(AuthError::InvalidToken)
            }
        }
    }

    pub async fn close(&self) {
        self.repo.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemoryUserRepo;
    use async_trait::async_trait;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryUserRepo::new()))
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("NAHIDUL"));
        assert!(is_valid_username("a.b-c_d@example.com"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(65)));
    }

    #[test]
    fn password_rules() {
        assert!(is_valid_password("pw123"));
        assert!(!is_valid_password(""));
        assert!(!is_valid_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)));
    }

    #[tokio::test]
    async fn verify_returns_same_identifier_every_time() {
        let store = store();
        let id = store.register("alice", "pw123").await.unwrap();
        for _ in 0..3 {
            assert_eq!(store.verify("alice", "pw123").await.unwrap(), id);
        }
    }

    #[tokio::test]
    async fn distinct_users_get_distinct_identifiers() {
        let store = store();
        let a = store.register("alice", "pw123").await.unwrap();
        let b = store.register("bob", "pw123").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let store = store();
        store.register("alice", "pw123").await.unwrap();

        let wrong_pw = store.verify("alice", "nope").await.unwrap_err();
        let unknown = store.verify("mallory", "pw123").await.unwrap_err();

        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let store = store();
        store.register("alice", "pw123").await.unwrap();
        assert!(matches!(
            store.verify("Alice", "pw123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn oversized_login_password_is_invalid_credentials() {
        let store = store();
        store.register("alice", "pw123").await.unwrap();
        let huge = "p".repeat(MAX_PASSWORD_BYTES + 1);

        let known = store.verify("alice", &huge).await.unwrap_err();
        let unknown = store.verify("mallory", &huge).await.unwrap_err();
        assert!(matches!(known, AuthError::InvalidCredentials));
        assert_eq!(known.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn require_user_rejects_unknown_subject() {
        let store = store();
        let id = store.register("alice", "pw123").await.unwrap();
        assert_eq!(store.require_user(id).await.unwrap().username, "alice");
        assert!(matches!(
            store.require_user(Uuid::new_v4()).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn second_registration_is_duplicate() {
        let store = store();
        store.register("alice", "pw123").await.unwrap();
        assert!(matches!(
            store.register("alice", "other").await,
            Err(AuthError::DuplicateUser)
        ));
        // the original password still works
        store.verify("alice", "pw123").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_has_one_winner() {
        let store = store();
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register("alice", &format!("pw-{i}")).await
            }));
        }

        let mut created = 0;
        let mut duplicates = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::DuplicateUser) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
    }

    struct BrokenRepo;

    #[async_trait]
    impl UserRepo for BrokenRepo {
        async fn insert(&self, _user: NewUser) -> anyhow::Result<InsertOutcome> {
            anyhow::bail!("connection reset")
        }
        async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("connection reset")
        }
        async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<User>> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn storage_failure_is_not_a_credential_error() {
        let store = CredentialStore::new(Arc::new(BrokenRepo));
        assert!(matches!(
            store.verify("alice", "pw123").await,
            Err(AuthError::Internal(_))
        ));
        assert!(matches!(
            store.register("alice", "pw123").await,
            Err(AuthError::Internal(_))
        ));
    }
}
