//! AI usage accounting over the append-only usage-event log

use super::models::{SubscriptionTier, UsageKind};
use super::pool::{DbError, DbPool};
use chrono::NaiveDate;
use serde::Serialize;

/// Sentinel chat limit reported for the unlimited tier, kept for mobile-app
/// compatibility.
pub const UNLIMITED_CHAT_SENTINEL: i32 = 999_999;

/// Raw event counts for one user over the current windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiUsageCounts {
    pub daily_analysis: i32,
    pub weekly_analysis: i32,
    pub daily_chat: i32,
}

/// Per-tier quota limits or remaining allowance.
///
/// The shape varies by tier: free plans are day-scoped, premium plans track
/// analysis weekly, and premium+ reports a bare unlimited flag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QuotaBreakdown {
    #[serde(rename_all = "camelCase")]
    Daily { daily_analysis: i32, daily_chat: i32 },
    #[serde(rename_all = "camelCase")]
    Weekly {
        weekly_analysis: i32,
        daily_chat: i32,
    },
    Unlimited { unlimited: bool },
}

/// Computed usage report returned by GET /ai-usage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsage {
    pub subscription_type: String,
    pub daily_analysis_count: i32,
    pub weekly_analysis_count: i32,
    pub daily_chat_count: i32,
    pub limits: QuotaBreakdown,
    pub remaining: QuotaBreakdown,
    pub used: i32,
    pub limit: i32,
}

impl AiUsage {
    /// Derive tier limits and remaining quota from raw counts.
    ///
    /// Remaining values clamp at zero. The legacy `used`/`limit` pair feeds
    /// the mobile chat screen: the free tier reports the all-time
    /// `ai_questions_used` counter from the user row, while paid tiers
    /// report the daily chat event count. The divergent free-tier source is
    /// intentional, observed behavior of the production system.
    pub fn compute(tier: SubscriptionTier, ai_questions_used: i32, counts: AiUsageCounts) -> Self {
        let (limits, remaining, used, limit) = match tier {
            SubscriptionTier::Free => (
                QuotaBreakdown::Daily {
                    daily_analysis: 1,
                    daily_chat: 3,
                },
                QuotaBreakdown::Daily {
                    daily_analysis: (1 - counts.daily_analysis).max(0),
                    daily_chat: (3 - counts.daily_chat).max(0),
                },
                ai_questions_used,
                3,
            ),
            SubscriptionTier::Premium => (
                QuotaBreakdown::Weekly {
                    weekly_analysis: 3,
                    daily_chat: 10,
                },
                QuotaBreakdown::Weekly {
                    weekly_analysis: (3 - counts.weekly_analysis).max(0),
                    daily_chat: (10 - counts.daily_chat).max(0),
                },
                counts.daily_chat,
                10,
            ),
            SubscriptionTier::PremiumPlus => (
                QuotaBreakdown::Unlimited { unlimited: true },
                QuotaBreakdown::Unlimited { unlimited: true },
                counts.daily_chat,
                UNLIMITED_CHAT_SENTINEL,
            ),
        };

        AiUsage {
            subscription_type: tier.as_str().to_string(),
            daily_analysis_count: counts.daily_analysis,
            weekly_analysis_count: counts.weekly_analysis,
            daily_chat_count: counts.daily_chat,
            limits,
            remaining,
            used,
            limit,
        }
    }
}

/// Repository for usage-event counting
pub struct UsageRepository {
    pool: DbPool,
}

impl UsageRepository {
    pub fn new(pool: DbPool) -> Self {
        UsageRepository { pool }
    }

    /// Count events of one kind on a single calendar day (UTC)
    pub async fn daily_count(
        &self,
        user_id: &str,
        kind: UsageKind,
        day: NaiveDate,
    ) -> Result<i32, DbError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                r#"
                SELECT COUNT(*)::INT AS count
                FROM ai_usage
                WHERE user_id = $1 AND usage_type = $2 AND created_at::date = $3
                "#,
                &[&user_id, &kind.as_str(), &day],
            )
            .await?;

        Ok(row.get("count"))
    }

    /// Count events of one kind on or after a calendar day (UTC)
    pub async fn count_since(
        &self,
        user_id: &str,
        kind: UsageKind,
        start: NaiveDate,
    ) -> Result<i32, DbError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                r#"
                SELECT COUNT(*)::INT AS count
                FROM ai_usage
                WHERE user_id = $1 AND usage_type = $2 AND created_at::date >= $3
                "#,
                &[&user_id, &kind.as_str(), &start],
            )
            .await?;

        Ok(row.get("count"))
    }

    /// Gather the three counts the usage report needs
    pub async fn collect(
        &self,
        user_id: &str,
        today: NaiveDate,
        week_start: NaiveDate,
    ) -> Result<AiUsageCounts, DbError> {
        let daily_analysis = self
            .daily_count(user_id, UsageKind::MarketAnalysis, today)
            .await?;
        let weekly_analysis = self
            .count_since(user_id, UsageKind::MarketAnalysis, week_start)
            .await?;
        let daily_chat = self.daily_count(user_id, UsageKind::Chat, today).await?;

        Ok(AiUsageCounts {
            daily_analysis,
            weekly_analysis,
            daily_chat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(daily_analysis: i32, weekly_analysis: i32, daily_chat: i32) -> AiUsageCounts {
        AiUsageCounts {
            daily_analysis,
            weekly_analysis,
            daily_chat,
        }
    }

    #[test]
    fn free_tier_one_analysis_today_exhausts_daily_quota() {
        let usage = AiUsage::compute(SubscriptionTier::Free, 0, counts(1, 1, 0));
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Daily {
                daily_analysis: 0,
                daily_chat: 3
            }
        );
    }

    #[test]
    fn free_tier_untouched_quota_is_full() {
        let usage = AiUsage::compute(SubscriptionTier::Free, 0, counts(0, 0, 0));
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Daily {
                daily_analysis: 1,
                daily_chat: 3
            }
        );
    }

    #[test]
    fn remaining_never_goes_negative() {
        let usage = AiUsage::compute(SubscriptionTier::Free, 0, counts(5, 5, 40));
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Daily {
                daily_analysis: 0,
                daily_chat: 0
            }
        );

        let usage = AiUsage::compute(SubscriptionTier::Premium, 0, counts(0, 12, 99));
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Weekly {
                weekly_analysis: 0,
                daily_chat: 0
            }
        );
    }

    #[test]
    fn premium_tracks_analysis_weekly() {
        let usage = AiUsage::compute(SubscriptionTier::Premium, 0, counts(1, 2, 4));
        assert_eq!(
            usage.limits,
            QuotaBreakdown::Weekly {
                weekly_analysis: 3,
                daily_chat: 10
            }
        );
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Weekly {
                weekly_analysis: 1,
                daily_chat: 6
            }
        );
    }

    #[test]
    fn premium_plus_is_unlimited() {
        let usage = AiUsage::compute(SubscriptionTier::PremiumPlus, 7, counts(9, 20, 50));
        assert_eq!(usage.limits, QuotaBreakdown::Unlimited { unlimited: true });
        assert_eq!(
            usage.remaining,
            QuotaBreakdown::Unlimited { unlimited: true }
        );
        assert_eq!(usage.limit, UNLIMITED_CHAT_SENTINEL);
        assert_eq!(usage.used, 50);
    }

    #[test]
    fn legacy_chat_pair_diverges_by_tier() {
        // Free reports the all-time counter from the user row, not the
        // daily event count.
        let free = AiUsage::compute(SubscriptionTier::Free, 2, counts(0, 0, 1));
        assert_eq!(free.used, 2);
        assert_eq!(free.limit, 3);

        // Premium reports the daily event count.
        let premium = AiUsage::compute(SubscriptionTier::Premium, 2, counts(0, 0, 4));
        assert_eq!(premium.used, 4);
        assert_eq!(premium.limit, 10);
    }

    #[test]
    fn usage_report_serializes_camel_case() {
        let usage = AiUsage::compute(SubscriptionTier::Free, 1, counts(1, 1, 2));
        let json = serde_json::to_value(&usage).unwrap();

        assert_eq!(json["subscriptionType"], "free");
        assert_eq!(json["dailyAnalysisCount"], 1);
        assert_eq!(json["weeklyAnalysisCount"], 1);
        assert_eq!(json["dailyChatCount"], 2);
        assert_eq!(json["limits"]["dailyAnalysis"], 1);
        assert_eq!(json["remaining"]["dailyChat"], 1);
        assert_eq!(json["used"], 1);
        assert_eq!(json["limit"], 3);
    }

    #[test]
    fn unlimited_breakdown_serializes_flag_only() {
        let json =
            serde_json::to_value(QuotaBreakdown::Unlimited { unlimited: true }).unwrap();
        assert_eq!(json, serde_json::json!({ "unlimited": true }));
    }
}
