use thiserror::Error;

use models::errors::ModelError;

use super::domain::IdentityError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid client request")]
    InvalidRequest,
    #[error("validation failed: {}", join_codes(.0))]
    Validation(Vec<IdentityError>),
    #[error("user already exists")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

fn join_codes(errors: &[IdentityError]) -> String {
    errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>().join(", ")
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::InvalidRequest => 1000,
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::InvalidToken(_) => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Failures the client is not told about in detail.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_))
    }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => AuthError::Validation(vec![IdentityError::new("InvalidUser", msg)]),
            ModelError::Duplicate(_) => AuthError::Conflict,
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}
