use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const RULE_AUTO_BUMP: &str = "auto-bump";
pub const RULE_AUTO_SYNC_ORDERS: &str = "auto-sync-orders";
pub const RULE_AUTO_SYNC_PRODUCTS: &str = "auto-sync-products";

/// Feature flag for one automated action, read by the scheduler each tick.
/// `last_run_at` suppresses duplicate triggers within a window across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AutomationSetting {
    pub id: String,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAutomationRequest {
    pub enabled: bool,
}
