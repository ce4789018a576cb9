//! Database models for user and quota data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription tier with associated AI quota limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTier {
    Free,
    Premium,
    PremiumPlus,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::PremiumPlus => "premium+",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "premium" => SubscriptionTier::Premium,
            "premium+" => SubscriptionTier::PremiumPlus,
            _ => SubscriptionTier::Free,
        }
    }

    /// Market-analysis requests allowed per calendar day (free tier only).
    pub fn daily_analysis_limit(&self) -> Option<i32> {
        match self {
            SubscriptionTier::Free => Some(1),
            _ => None,
        }
    }

    /// Market-analysis requests allowed per 7-calendar-day window
    /// (premium tier only).
    pub fn weekly_analysis_limit(&self) -> Option<i32> {
        match self {
            SubscriptionTier::Premium => Some(3),
            _ => None,
        }
    }

    /// Chat messages allowed per calendar day. None means unlimited.
    pub fn daily_chat_limit(&self) -> Option<i32> {
        match self {
            SubscriptionTier::Free => Some(3),
            SubscriptionTier::Premium => Some(10),
            SubscriptionTier::PremiumPlus => None,
        }
    }
}

/// User record from the database
#[derive(Debug, Clone)]
pub struct DbUser {
    pub user_id: String,
    pub email: String,
    pub password_hash: String,
    pub subscription_type: String,
    pub ai_questions_used: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUser {
    pub fn tier(&self) -> SubscriptionTier {
        SubscriptionTier::from_str(&self.subscription_type)
    }
}

/// Password reset token record
#[derive(Debug, Clone)]
pub struct DbResetToken {
    pub id: Uuid,
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// AI usage event kind recorded in the append-only usage log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    MarketAnalysis,
    Chat,
}

impl UsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::MarketAnalysis => "market_analysis",
            UsageKind::Chat => "chat",
        }
    }
}

/// User summary shape returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub email: String,
    pub subscription_type: String,
    pub ai_questions_used: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserSummary {
    pub fn from_user(user: &DbUser) -> Self {
        UserSummary {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            subscription_type: user.subscription_type.clone(),
            ai_questions_used: user.ai_questions_used,
            created_at: None,
        }
    }

    /// Summary including the creation timestamp, used by the profile endpoint.
    pub fn with_created_at(user: &DbUser) -> Self {
        UserSummary {
            created_at: Some(user.created_at),
            ..Self::from_user(user)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_known_values() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::Premium,
            SubscriptionTier::PremiumPlus,
        ] {
            assert_eq!(SubscriptionTier::from_str(tier.as_str()), tier);
        }
    }

    #[test]
    fn unknown_tier_falls_back_to_free() {
        assert_eq!(SubscriptionTier::from_str("gold"), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::from_str(""), SubscriptionTier::Free);
        assert_eq!(
            SubscriptionTier::from_str("PREMIUM"),
            SubscriptionTier::Premium
        );
    }

    #[test]
    fn tier_limits_match_plan_table() {
        assert_eq!(SubscriptionTier::Free.daily_analysis_limit(), Some(1));
        assert_eq!(SubscriptionTier::Free.daily_chat_limit(), Some(3));
        assert_eq!(SubscriptionTier::Premium.weekly_analysis_limit(), Some(3));
        assert_eq!(SubscriptionTier::Premium.daily_chat_limit(), Some(10));
        assert_eq!(SubscriptionTier::PremiumPlus.daily_chat_limit(), None);
        assert_eq!(SubscriptionTier::PremiumPlus.weekly_analysis_limit(), None);
    }

    #[test]
    fn user_summary_serializes_camel_case() {
        let user = DbUser {
            user_id: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$2b$12$hash".into(),
            subscription_type: "free".into(),
            ai_questions_used: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserSummary::from_user(&user)).unwrap();
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["subscriptionType"], "free");
        assert_eq!(json["aiQuestionsUsed"], 0);
        // Only the profile endpoint exposes createdAt
        assert!(json.get("createdAt").is_none());

        let with_ts = serde_json::to_value(UserSummary::with_created_at(&user)).unwrap();
        assert!(with_ts.get("createdAt").is_some());
    }
}
