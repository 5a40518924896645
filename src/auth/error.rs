use thiserror::Error;

/// Failures of the credential store and the token service.
///
/// The `Display` strings are what clients see, so they carry no detail
/// about which part of a credential or token was wrong.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already registered")]
    DuplicateUser,

    /// Unknown username and wrong password both end up here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    /// Storage, hashing or signing failure. Never an authentication verdict.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;
