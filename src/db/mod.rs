//! Database module for PostgreSQL connectivity
//!
//! Provides connection pool management and per-table repositories for the
//! inversia_auth database.

pub mod models;
pub mod pool;
pub mod reset_tokens;
pub mod usage;
pub mod users;

pub use models::{DbResetToken, DbUser, SubscriptionTier, UsageKind, UserSummary};
pub use pool::{DbError, DbPool};
pub use reset_tokens::ResetTokenRepository;
pub use usage::{AiUsage, AiUsageCounts, UsageRepository};
pub use users::UserRepository;
