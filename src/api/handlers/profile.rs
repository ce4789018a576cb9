//! Profile and subscription handlers
//!
//! Both require the access token middleware; the authenticated user is
//! read from request extensions.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::middleware::{AuthUserExt, AuthenticatedUser};
use crate::api::response::ApiResponse;
use crate::db::{SubscriptionTier, UserRepository, UserSummary};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeData {
    pub subscription_type: String,
}

fn authenticated(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    req.auth_user()
        .ok_or_else(|| ApiError::auth("Token de acceso requerido"))
}

/// Current user profile
/// GET /profile
pub async fn get_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let auth = authenticated(&req)?;

    // Re-read rather than trusting the middleware snapshot; an absent row
    // here means the store is inconsistent with the token.
    let user = UserRepository::new(state.pool.clone())
        .find_by_user_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data_only(ProfileData {
        user: UserSummary::with_created_at(&user),
    })))
}

/// Upgrade the subscription to premium
/// POST /upgrade
///
/// Payment verification happens upstream; this endpoint only flips the
/// tier. Idempotent.
pub async fn upgrade_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let auth = authenticated(&req)?;
    let tier = SubscriptionTier::Premium;

    UserRepository::new(state.pool.clone())
        .set_subscription(&auth.user_id, tier.as_str())
        .await?;

    info!(user_id = %auth.user_id, tier = %tier.as_str(), "Subscription upgraded");

    Ok(HttpResponse::Ok().json(ApiResponse::with_data(
        "Suscripción actualizada a premium exitosamente",
        UpgradeData {
            subscription_type: tier.as_str().to_string(),
        },
    )))
}
