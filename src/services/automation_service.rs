use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::AutomationSetting;

/// Feature flags for the scheduler's automated actions, plus last-run
/// bookkeeping so a rule does not fire twice inside its window (including
/// across process restarts).
#[derive(Clone)]
pub struct AutomationService {
    pool: SqlitePool,
}

impl AutomationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> AppResult<Vec<AutomationSetting>> {
        let settings = sqlx::query_as::<_, AutomationSetting>(
            "SELECT * FROM automation_settings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO automation_settings (id, enabled, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                enabled = excluded.enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(enabled)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_enabled(&self, id: &str) -> AppResult<bool> {
        let enabled: Option<bool> =
            sqlx::query_scalar("SELECT enabled FROM automation_settings WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(enabled.unwrap_or(false))
    }

    /// True when the rule has never run or its last run is older than `window`.
    pub async fn is_due(&self, id: &str, window: Duration) -> AppResult<bool> {
        let last_run: Option<Option<chrono::DateTime<Utc>>> =
            sqlx::query_scalar("SELECT last_run_at FROM automation_settings WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match last_run.flatten() {
            Some(at) => Utc::now() - at >= window,
            None => true,
        })
    }

    pub async fn mark_ran(&self, id: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO automation_settings (id, enabled, last_run_at, updated_at)
            VALUES (?, 0, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                last_run_at = excluded.last_run_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RULE_AUTO_BUMP;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> AutomationService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        AutomationService::new(pool)
    }

    #[tokio::test]
    async fn test_flags_default_to_disabled() {
        let service = test_service().await;
        assert!(!service.is_enabled(RULE_AUTO_BUMP).await.unwrap());

        service.set_enabled(RULE_AUTO_BUMP, true).await.unwrap();
        assert!(service.is_enabled(RULE_AUTO_BUMP).await.unwrap());

        service.set_enabled(RULE_AUTO_BUMP, false).await.unwrap();
        assert!(!service.is_enabled(RULE_AUTO_BUMP).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_rule_is_due() {
        let service = test_service().await;
        assert!(service.is_due("never-seen", Duration::minutes(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_ran_suppresses_until_window_passes() {
        let service = test_service().await;
        service.mark_ran(RULE_AUTO_BUMP).await.unwrap();
        assert!(!service
            .is_due(RULE_AUTO_BUMP, Duration::minutes(10))
            .await
            .unwrap());
        // A zero-width window is immediately due again.
        assert!(service
            .is_due(RULE_AUTO_BUMP, Duration::zero())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_mark_ran_preserves_enabled_flag() {
        let service = test_service().await;
        service.set_enabled(RULE_AUTO_BUMP, true).await.unwrap();
        service.mark_ran(RULE_AUTO_BUMP).await.unwrap();
        assert!(service.is_enabled(RULE_AUTO_BUMP).await.unwrap());
    }
}
