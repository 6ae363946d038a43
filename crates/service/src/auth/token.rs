//! Bearer token issuing and verification (HS256).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Signing parameters for issued tokens.
#[derive(Clone)]
pub struct TokenSettings {
    pub key: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .finish()
    }
}

impl From<&configs::JwtConfig> for TokenSettings {
    fn from(c: &configs::JwtConfig) -> Self {
        Self {
            key: c.key.clone(),
            issuer: c.issuer.clone(),
            audience: c.audience.clone(),
            expiry_minutes: c.expiry_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub jti: String,
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}

pub struct TokenIssuer {
    settings: TokenSettings,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(settings: TokenSettings) -> Self {
        let encoding = EncodingKey::from_secret(settings.key.as_bytes());
        let decoding = DecodingKey::from_secret(settings.key.as_bytes());
        Self { settings, encoding, decoding }
    }

    pub fn issue(&self, user: &AuthUser) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Sign a token for `user` as if issued at `now`.
    pub fn issue_at(&self, user: &AuthUser, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let exp = Duration::try_minutes(self.settings.expiry_minutes)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                AuthError::TokenError(format!("expiry window of {} minutes is out of range", self.settings.expiry_minutes))
            })?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            name: user.name.clone(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    /// Check signature, lifetime, issuer and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
