use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;
use crate::routes::AppState;

const HASH_SCHEME: &str = "pbkdf2-sha256";
const HASH_LEN: usize = 32;
const SALT_LEN: usize = 16;

#[cfg(not(test))]
const HASH_ITERATIONS: u32 = 210_000;
#[cfg(test)]
const HASH_ITERATIONS: u32 = 1_000;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
    #[error("malformed password hash")]
    MalformedHash,
}

/// Salted PBKDF2 hash, encoded as `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    encode_hash(password, &salt, HASH_ITERATIONS)
}

fn encode_hash(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut key = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    let b64 = &base64::engine::general_purpose::STANDARD_NO_PAD;
    format!("{HASH_SCHEME}${iterations}${}${}", b64.encode(salt), b64.encode(key))
}

pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let mut fields = encoded.split('$');
    let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(expected), None) =
        (fields.next(), fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(AuthError::MalformedHash);
    };

    let iterations: u32 = iterations.parse().map_err(|_| AuthError::MalformedHash)?;
    let b64 = &base64::engine::general_purpose::STANDARD_NO_PAD;
    let salt = b64.decode(salt).map_err(|_| AuthError::MalformedHash)?;
    let expected = b64.decode(expected).map_err(|_| AuthError::MalformedHash)?;
    if expected.is_empty() {
        return Err(AuthError::MalformedHash);
    }

    let mut key = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    // Constant-time comparison.
    let diff = key.iter().zip(&expected).fold(0u8, |acc, (a, b)| acc | (a ^ b));
    Ok(diff == 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// HS256 token issuer and verifier.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttls(secret, Duration::minutes(15), Duration::days(7))
    }

    pub fn with_ttls(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Expiry a refresh token issued now would carry.
    pub fn refresh_expiry(&self) -> DateTime<Utc> {
        Utc::now() + self.refresh_ttl
    }

    pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())?;
        if data.claims.kind != expected {
            return Err(AuthError::WrongKind { expected });
        }
        Ok(data.claims)
    }
}

/// The user behind a valid `Authorization: Bearer <access token>` header.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required.".into()))?;

        let claims = state
            .tokens
            .verify(token, TokenKind::Access)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token.".into()))?;

        state
            .store
            .find_user(claims.sub)
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthorized("User not found.".into()))
    }
}
