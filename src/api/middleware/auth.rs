//! Access token extraction and the authenticated-user extension

use actix_web::{dev::ServiceRequest, http::header::AUTHORIZATION, HttpMessage};

use crate::db::models::DbUser;

/// Authenticated user injected into request extensions by the middleware.
///
/// Carries the row state the protected handlers need; each handler still
/// re-reads the store for anything it mutates.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub subscription_type: String,
    pub ai_questions_used: i32,
}

impl From<&DbUser> for AuthenticatedUser {
    fn from(user: &DbUser) -> Self {
        AuthenticatedUser {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            subscription_type: user.subscription_type.clone(),
            ai_questions_used: user.ai_questions_used,
        }
    }
}

/// Extract the access token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let auth = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

/// Trait for reading the authenticated user from request extensions
pub trait AuthUserExt {
    fn auth_user(&self) -> Option<AuthenticatedUser>;
}

impl<T: HttpMessage> AuthUserExt for T {
    fn auth_user(&self) -> Option<AuthenticatedUser> {
        self.extensions().get::<AuthenticatedUser>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn extracts_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        let req = TestRequest::default().to_srv_request();
        assert!(extract_bearer_token(&req).is_none());

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_srv_request();
        assert!(extract_bearer_token(&req).is_none());
    }
}
