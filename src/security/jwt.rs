/// Bearer-token codec
///
/// Issues and verifies signed, time-bounded HS256 tokens whose subject is the
/// username. Verification distinguishes an expired token from every other
/// failure so the middleware can report them as separate kinds.
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: usize,
    /// Expiration (unix seconds)
    pub exp: usize,
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Build a codec from configuration. Without a configured secret a random
    /// process-lifetime key is generated; a restart then invalidates every
    /// outstanding token.
    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) => Self::new(secret.as_bytes(), config.token_ttl_secs),
            None => {
                let mut key = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut key);
                tracing::warn!(
                    "JWT_SECRET not set, using an ephemeral signing key; \
                     tokens will not survive a restart"
                );
                Self::new(&key, config.token_ttl_secs)
            }
        }
    }

    /// Create a signed token for `subject`, expiring after the validity window.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now as usize,
            exp: (now + self.ttl_secs) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature and expiry; returns the embedded subject.
    pub fn verify(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid,
            })?;

        Ok(data.claims.sub)
    }
}
