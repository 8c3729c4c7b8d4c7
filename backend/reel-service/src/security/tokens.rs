/// HS256 token issuance and verification — the identity gate.
///
/// Mutating endpoints require a valid token (enforced by the `JwtAuth`
/// middleware); the feed accepts requests without one and treats an
/// absent or invalid token as an anonymous viewer via [`TokenManager::identify`].
use actix_web::HttpRequest;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// JWT claims carried by every issued token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user ID as a decimal string
    pub sub: String,
    /// Expiration time (Unix seconds)
    pub exp: usize,
    /// Issued at (Unix seconds)
    pub iat: usize,
}

/// Issues and verifies bearer tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenManager {
    secret: String,
    expiry_hours: i64,
}

impl TokenManager {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        Self {
            secret,
            expiry_hours,
        }
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let exp = now + self.expiry_hours * 3600;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp as usize,
            iat: now as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Verify a token and return the user ID it was issued to.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let validation = Validation::new(Algorithm::HS256);
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))
    }

    /// Resolve the viewer from a request's Authorization header, if any.
    ///
    /// Missing header, wrong scheme and failed verification all resolve to
    /// `None` (anonymous) rather than an error.
    pub fn identify(&self, req: &HttpRequest) -> Option<i64> {
        let header = req.headers().get("Authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.verify(token).ok()
    }
}
