//! Bearer sessions
//!
//! A login produces a signed HS256 token carrying the user's id, name, email
//! and role. The token is the whole session: the server keeps no session table.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::error::{Result, VaultError};
use crate::user::{Principal, Role, User};

const ISSUER: &str = "gerenciador-acessos";

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub nome: String,
    pub role: Role,
    pub iss: String,
    /// Session id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    /// Session ID for logging
    pub session_id: String,
}

impl Session {
    /// Default session duration: 24 hours
    pub const DEFAULT_DURATION_SECS: u64 = 24 * 60 * 60;

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Get remaining time in seconds
    pub fn remaining_secs(&self) -> u64 {
        (self.expires_at - Utc::now()).num_seconds().max(0) as u64
    }
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
            clock,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Start a session for `user`
    pub fn issue(&self, user: &User) -> Result<Session> {
        let now = self.clock.now();
        let expires_at = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                VaultError::validation(format!("Session lifetime out of range: {}s", self.ttl_secs))
            })?;
        let session_id = uuid::Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            nome: user.name.clone(),
            role: user.role,
            iss: ISSUER.to_string(),
            jti: session_id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| VaultError::EncryptionError(format!("Token signing failed: {}", e)))?;

        debug!(
            "Issued session {} for user {} expiring at {}",
            session_id, user.id, expires_at
        );

        Ok(Session {
            token,
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            expires_at,
            session_id,
        })
    }

    /// Check a token's signature and expiry
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VaultError::SessionExpired,
                _ => VaultError::InvalidSession,
            })
    }

    /// User id from validated claims
    pub fn subject(claims: &Claims) -> Result<u64> {
        claims.sub.parse().map_err(|_| VaultError::InvalidSession)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
