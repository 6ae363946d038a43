use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use service::auth::{
    domain::{LoginInput, RegisterInput},
    errors::AuthError,
    repository::AuthRepository,
    token::Claims,
    AuthConfig, AuthService,
};

use crate::errors::{ErrorBody, JsonApiError};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self {
        Self { auth: Arc::new(AuthService::new(repo, cfg)) }
    }
}

/// Fields are optional so a missing one maps to 400 rather than a deserialization rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegisterRequest {
    fn into_input(self) -> Option<RegisterInput> {
        Some(RegisterInput { name: self.name?, email: self.email?, password: self.password? })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    fn into_input(self) -> Option<LoginInput> {
        Some(LoginInput { email: self.email?, password: self.password? })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

fn unreadable_body(e: JsonRejection) -> JsonApiError {
    debug!(error = %e, "rejected request body");
    AuthError::InvalidRequest.into()
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = RegisterRequest, responses(
    (status = 200, description = "Registered", body = MessageResponse),
    (status = 400, description = "Missing fields or identity rules violated", body = ErrorBody),
    (status = 409, description = "Email already registered", body = ErrorBody)
))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    let Json(body) = payload.map_err(unreadable_body)?;
    let input = body.into_input().ok_or(AuthError::InvalidRequest)?;
    state.auth.register(input).await?;
    Ok(Json(MessageResponse::ok("User Created Successfully")))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = LoginRequest, responses(
    (status = 200, description = "Logged in", body = LoginResponse),
    (status = 400, description = "Missing fields", body = ErrorBody),
    (status = 401, description = "Invalid email or password", body = ErrorBody)
))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), JsonApiError> {
    let Json(body) = payload.map_err(unreadable_body)?;
    let input = body.into_input().ok_or(AuthError::InvalidRequest)?;
    let session = state.auth.login(input).await?;

    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginResponse { success: true, expires_at: session.token.expires_at(), token: session.token.token };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/logout", tag = "auth", responses(
    (status = 200, description = "Signed out", body = MessageResponse)
))]
pub async fn logout(State(state): State<ServerState>, headers: HeaderMap, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let claims = match extract_token(&headers, &jar) {
        Ok(Some(token)) => state.auth.verify_token(&token).ok(),
        _ => None,
    };
    state.auth.logout(claims.as_ref());
    let mut expired = Cookie::from(AUTH_COOKIE);
    expired.set_path("/");
    let jar = jar.remove(expired);
    (jar, Json(MessageResponse::ok("Logged out successfully")))
}

#[utoipa::path(get, path = "/me", tag = "auth", responses(
    (status = 200, description = "Identity carried by the bearer token", body = MeResponse),
    (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
))]
pub async fn me(Extension(claims): Extension<Claims>) -> Result<Json<MeResponse>, JsonApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(MeResponse { user_id, email: claims.email, name: claims.name }))
}

/// Bearer token from `Authorization`, falling back to the `auth_token` cookie.
/// A non-Bearer `Authorization` header is an error rather than a fallback.
fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Result<Option<String>, JsonApiError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let raw = value.to_str().unwrap_or_default();
        return match raw.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("Authorization header must be 'Bearer <token>'")),
        };
    }
    Ok(jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty()))
}

/// Route layer: verify the bearer token and expose its [`Claims`] to handlers.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(req.headers(), &jar)? else {
        warn!(%path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("Missing bearer token"));
    };
    let claims = state.auth.verify_token(&token).map_err(|e| {
        warn!(%path, error = %e, "token validation failed");
        JsonApiError::from(e)
    })?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
