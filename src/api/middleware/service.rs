//! Access token middleware
//!
//! Actix-web middleware guarding the authenticated routes. Verifies the
//! bearer access token, re-reads the user row, and injects the
//! authenticated user into request extensions for downstream handlers.

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use tracing::warn;

use super::auth::{extract_bearer_token, AuthenticatedUser};
use crate::api::error::INTERNAL_ERROR_MESSAGE;
use crate::api::response::ApiResponse;
use crate::auth::TokenIssuer;
use crate::db::{DbPool, UserRepository};

/// Middleware factory for routes that require a valid access token
pub struct RequireAuth {
    pool: DbPool,
    tokens: TokenIssuer,
}

impl RequireAuth {
    pub fn new(pool: DbPool, tokens: TokenIssuer) -> Self {
        RequireAuth { pool, tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Transform = RequireAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireAuthService {
            service: Rc::new(service),
            pool: self.pool.clone(),
            tokens: self.tokens.clone(),
        })
    }
}

/// The actual middleware service
pub struct RequireAuthService<S> {
    service: Rc<S>,
    pool: DbPool,
    tokens: TokenIssuer,
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::failure(message))
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut core::task::Context<'_>,
    ) -> core::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let pool = self.pool.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    let response = unauthorized("Token de acceso requerido");
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let user_id = match tokens.verify_access(&token) {
                Ok(user_id) => user_id,
                Err(e) => {
                    warn!(error = %e, "Access token rejected");
                    let response = unauthorized("Token inválido o expirado");
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            // Re-read the user on every request; a deleted account must not
            // keep working for the lifetime of its last access token.
            let repo = UserRepository::new(pool);
            let user = match repo.find_by_user_id(&user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(user_id = %user_id, "Valid token for missing user");
                    let response = unauthorized("Usuario no encontrado");
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load user for auth");
                    let response = HttpResponse::InternalServerError()
                        .json(ApiResponse::failure(INTERNAL_ERROR_MESSAGE));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(AuthenticatedUser::from(&user));

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
