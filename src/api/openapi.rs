//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    auth::{LoginRequest, RefreshRequest, RegisterRequest},
    health::HealthResponse,
};
use crate::db::models::UserSummary;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inversia Auth API",
        version = "1.0.0",
        description = "User authentication and AI usage quota API for the Inversia trading assistant",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "auth", description = "Registration, login, and token endpoints")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UserSummary,
        )
    )
)]
pub struct ApiDoc;
