use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, AuthUser, IdentityError, LoginInput, NewUser, RegisterInput};
use super::errors::AuthError;
use super::password::{self, PasswordPolicy, PASSWORD_ALGORITHM};
use super::repository::AuthRepository;
use super::token::{Claims, TokenIssuer, TokenSettings};

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub token: TokenSettings,
    pub password_policy: PasswordPolicy,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(token: TokenSettings) -> Self {
        Self { token, password_policy: PasswordPolicy::default(), password_algorithm: PASSWORD_ALGORITHM.into() }
    }

    pub fn from_app_config(cfg: &configs::AppConfig) -> Self {
        Self {
            token: (&cfg.jwt).into(),
            password_policy: (&cfg.password).into(),
            password_algorithm: PASSWORD_ALGORITHM.into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    policy: PasswordPolicy,
    password_algorithm: String,
    tokens: TokenIssuer,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self {
            repo,
            policy: cfg.password_policy,
            password_algorithm: cfg.password_algorithm,
            tokens: TokenIssuer::new(cfg.token),
        }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::{domain::RegisterInput, token::TokenSettings};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let settings = TokenSettings { key: "k".repeat(32), issuer: "iss".into(), audience: "aud".into(), expiry_minutes: 60 };
    /// let svc = AuthService::new(repo, AuthConfig::new(settings));
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123!".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.name.is_empty() || input.email.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidRequest);
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let mut errors = validate_user(&input);
        errors.extend(self.policy.validate(&input.password));
        if !errors.is_empty() {
            debug!(count = errors.len(), "registration rejected by identity rules");
            return Err(AuthError::Validation(errors));
        }

        let password_hash = password::hash(&input.password)?;
        let user = self.repo
            .create_user(NewUser {
                email: input.email,
                name: input.name,
                password_hash,
                password_algorithm: self.password_algorithm.clone(),
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token.
    ///
    /// Unknown email and wrong password both yield [`AuthError::Unauthorized`].
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::{domain::{RegisterInput, LoginInput}, token::TokenSettings};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let settings = TokenSettings { key: "k".repeat(32), issuer: "iss".into(), audience: "aud".into(), expiry_minutes: 60 };
    /// let svc = AuthService::new(repo, AuthConfig::new(settings));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd!".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidRequest);
        }
        let Some(user) = self.repo.find_user_by_email(&input.email).await? else {
            password::verify_decoy(&input.password);
            warn!("login failed: unknown email");
            return Err(AuthError::Unauthorized);
        };

        let Some(cred) = self.repo.get_credentials(user.id).await? else {
            password::verify_decoy(&input.password);
            warn!(user_id = %user.id, "login failed: no credentials on record");
            return Err(AuthError::Unauthorized);
        };

        if !password::verify(&input.password, &cred.password_hash) {
            warn!(user_id = %user.id, "login failed: password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, jti = %token.claims.jti, exp = token.claims.exp, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Tokens are stateless; signing out only records the event.
    pub fn logout(&self, claims: Option<&Claims>) {
        match claims {
            Some(c) => info!(user_id = %c.sub, jti = %c.jti, "user_signed_out"),
            None => debug!("sign-out without a session"),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }
}

fn validate_user(input: &RegisterInput) -> Vec<IdentityError> {
    let mut errors = Vec::new();
    if models::user::validate_email(&input.email).is_err() {
        errors.push(IdentityError::new("InvalidEmail", format!("Email '{}' is invalid.", input.email.trim())));
    }
    if let Err(e) = models::user::validate_name(&input.name) {
        errors.push(IdentityError::new("InvalidName", e.to_string()));
    }
    errors
}
