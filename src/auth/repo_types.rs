use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // stable identifier tokens bind to
    pub username: String,           // unique, case-sensitive
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 verifier, not exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
}

/// A user about to be stored; the verifier is already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Result of an insert against the username uniqueness constraint.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(User),
    Duplicate,
}
