use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Verifier checked when the username is unknown, so that path pays the
    /// same Argon2 cost as a wrong password.
    static ref DUMMY_HASH: String = hash_password("sheetvault-dummy-password")
        .expect("argon2 must hash a constant password");
}

/// Builds [`DUMMY_HASH`] up front so a broken Argon2 setup fails at startup
/// instead of on the first unknown-user login.
pub fn init_dummy_hash() {
    lazy_static::initialize(&DUMMY_HASH);
}

/// Salted Argon2id verifier in PHC string format.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!("hash password: {e}")
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Burns one verification against [`DUMMY_HASH`]. Always reports a mismatch.
pub fn verify_dummy(plain: &str) -> bool {
    if let Err(e) = verify_password(plain, &DUMMY_HASH) {
        error!(error = %e, "dummy verification failed");
    }
    false
}
