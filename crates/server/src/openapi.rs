use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::errors::ErrorBody;
use crate::routes::auth::{LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            MeResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
