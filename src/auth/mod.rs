use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::DatabaseError;

/// Token payload. Field names match what dashboard clients decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i32, username: impl Into<String>, expiry: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username: username.into(),
            exp: (now + expiry).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingCredentials(&'static str),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Old password is incorrect")]
    WrongPassword,

    #[error("A user with that name already exists")]
    UsernameTaken,

    #[error("User does not exist")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// HMAC signing material plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl JwtKeys {
    pub fn new(secret: &[u8], expiry_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry: Duration::hours(expiry_hours as i64),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.as_bytes(), security.jwt_expiry_hours)
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a signed token for the given user.
    pub fn issue(&self, user_id: i32, username: &str) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, username, self.expiry))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiry_hours", &self.expiry.num_hours())
            .finish_non_exhaustive()
    }
}

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Compare a password against a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
