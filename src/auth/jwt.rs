use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{
    claims::Claims,
    error::{AuthError, AuthResult},
};
use crate::{config::JwtConfig, state::AppState};

/// Fixed lifetime of every session token.
pub const TOKEN_TTL: Duration = Duration::hours(24);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and validates HS256 session tokens.
///
/// Built once from [`JwtConfig`] at startup; cloning is cheap enough to hand
/// a copy to every request through `FromRef`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // Expiry is compared against an explicit clock in `validate_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn issue(&self, subject: Uuid) -> AuthResult<String> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: Uuid, now: OffsetDateTime) -> AuthResult<String> {
        let exp = now + TOKEN_TTL;
        let claims = Claims {
            sub: subject,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("jwt encode: {e}")))?;
        debug!(user_id = %subject, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> AuthResult<Uuid> {
        self.validate_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature, algorithm, issuer and audience, then expiry against `now`.
    pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> AuthResult<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(kind = ?e.kind(), "jwt rejected");
            AuthError::InvalidToken
        })?;

        let claims = data.claims;
        if now.unix_timestamp() >= claims.exp {
            debug!(user_id = %claims.sub, exp = claims.exp, "jwt expired");
            return Err(AuthError::ExpiredToken);
        }

        debug!(user_id = %claims.sub, "jwt verified");
        Ok(claims.sub)
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
