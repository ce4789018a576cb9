//! API module - HTTP routes and handlers

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::middleware::RequireAuth;
use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth: RequireAuth) {
    cfg
        // Public auth endpoints
        .route("/register", web::post().to(handlers::auth::register))
        .route("/login", web::post().to(handlers::auth::login))
        .route("/refresh", web::post().to(handlers::auth::refresh))
        .route("/logout", web::post().to(handlers::auth::logout))
        .route(
            "/forgot-password",
            web::post().to(handlers::auth::forgot_password),
        )
        .route(
            "/reset-password",
            web::post().to(handlers::auth::reset_password),
        )
        .route("/health", web::get().to(handlers::health::health_check))
        // Swagger UI and OpenAPI spec
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        // Endpoints behind the access token middleware. The empty-prefix
        // scope is registered last so the public routes above match first.
        .service(
            web::scope("")
                .wrap(auth)
                .route("/profile", web::get().to(handlers::profile::get_profile))
                .route(
                    "/upgrade",
                    web::post().to(handlers::profile::upgrade_subscription),
                )
                .route("/ai-usage", web::get().to(handlers::usage::get_ai_usage)),
        );
}
