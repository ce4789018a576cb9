//! AI usage accounting handler

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUserExt;
use crate::api::response::ApiResponse;
use crate::db::{AiUsage, SubscriptionTier, UsageRepository};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UsageData {
    pub usage: AiUsage,
}

/// Current AI usage and remaining quota for the authenticated user
/// GET /ai-usage
pub async fn get_ai_usage(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let auth = req
        .auth_user()
        .ok_or_else(|| ApiError::auth("Token de acceso requerido"))?;

    // Calendar-day boundaries in UTC; the week is 7 calendar days, not a
    // rolling 168 hours.
    let today = Utc::now().date_naive();
    let week_start = today - Duration::days(7);

    let counts = UsageRepository::new(state.pool.clone())
        .collect(&auth.user_id, today, week_start)
        .await?;

    let usage = AiUsage::compute(
        SubscriptionTier::from_str(&auth.subscription_type),
        auth.ai_questions_used,
        counts,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::data_only(UsageData { usage })))
}
