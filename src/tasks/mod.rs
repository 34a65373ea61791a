//! Background automation for the application.
//!
//! One recurring driver fires every minute and runs whichever automated
//! actions are enabled: boosting flagged products and re-syncing orders or
//! products. Call `spawn_all` once during startup to launch it.

use chrono::Duration;

use crate::services::{AutomationService, ProductService, SyncService};
use crate::models::{RULE_AUTO_BUMP, RULE_AUTO_SYNC_ORDERS, RULE_AUTO_SYNC_PRODUCTS};

const TICK_SECS: u64 = 60;
/// Auto-sync rules fire at most once per window, persisted across restarts.
const SYNC_WINDOW_MINUTES: i64 = 10;

/// Spawn the automation driver.
///
/// Notes
/// - Each action per tick fails independently; one broken action never blocks
///   the others.
/// - Actions are idempotent, so an overlapping slow tick is harmless.
/// - This function detaches the loop via `tokio::spawn`; it does not block.
pub fn spawn_all(
    automation_service: AutomationService,
    product_service: ProductService,
    sync_service: SyncService,
    sandbox: bool,
) {
    tokio::spawn(async move {
        loop {
            run_tick(&automation_service, &product_service, &sync_service, sandbox).await;
            tokio::time::sleep(std::time::Duration::from_secs(TICK_SECS)).await;
        }
    });
}

pub async fn run_tick(
    automation: &AutomationService,
    products: &ProductService,
    sync: &SyncService,
    sandbox: bool,
) {
    if let Err(e) = run_auto_bump(automation, products, sandbox).await {
        log::error!("Auto-bump action failed: {e:?}");
    }
    if let Err(e) = run_auto_sync_orders(automation, sync).await {
        log::error!("Auto-sync-orders action failed: {e:?}");
    }
    if let Err(e) = run_auto_sync_products(automation, sync).await {
        log::error!("Auto-sync-products action failed: {e:?}");
    }
}

/// Sandbox cooldown is short so the flow can be exercised end to end without
/// waiting out the production rate limit.
pub fn bump_cooldown(sandbox: bool) -> Duration {
    if sandbox {
        Duration::minutes(1)
    } else {
        Duration::hours(4)
    }
}

async fn run_auto_bump(
    automation: &AutomationService,
    products: &ProductService,
    sandbox: bool,
) -> crate::error::AppResult<()> {
    if !automation.is_enabled(RULE_AUTO_BUMP).await? {
        return Ok(());
    }

    let eligible = products.eligible_auto_bump(bump_cooldown(sandbox)).await?;
    if eligible.is_empty() {
        return Ok(());
    }

    log::debug!("Auto-bump: {} eligible products", eligible.len());
    let report = products.bump_products(&eligible).await?;
    if !report.failures.is_empty() {
        log::warn!(
            "Auto-bump: {} boosted, {} failed",
            report.synced,
            report.failures.len()
        );
    } else if report.synced > 0 {
        log::info!("Auto-bump: boosted {} products", report.synced);
    }
    automation.mark_ran(RULE_AUTO_BUMP).await?;
    Ok(())
}

async fn run_auto_sync_orders(
    automation: &AutomationService,
    sync: &SyncService,
) -> crate::error::AppResult<()> {
    if !automation.is_enabled(RULE_AUTO_SYNC_ORDERS).await?
        || !automation
            .is_due(RULE_AUTO_SYNC_ORDERS, Duration::minutes(SYNC_WINDOW_MINUTES))
            .await?
    {
        return Ok(());
    }

    let report = sync.sync_orders(None).await?;
    log::info!(
        "Auto-sync-orders: {} synced, {} failed",
        report.synced,
        report.failures.len()
    );
    automation.mark_ran(RULE_AUTO_SYNC_ORDERS).await?;
    Ok(())
}

async fn run_auto_sync_products(
    automation: &AutomationService,
    sync: &SyncService,
) -> crate::error::AppResult<()> {
    if !automation.is_enabled(RULE_AUTO_SYNC_PRODUCTS).await?
        || !automation
            .is_due(RULE_AUTO_SYNC_PRODUCTS, Duration::minutes(SYNC_WINDOW_MINUTES))
            .await?
    {
        return Ok(());
    }

    let report = sync.sync_products().await?;
    log::info!(
        "Auto-sync-products: {} synced, {} failed",
        report.synced,
        report.failures.len()
    );
    automation.mark_ran(RULE_AUTO_SYNC_PRODUCTS).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_cooldown_per_environment() {
        assert_eq!(bump_cooldown(true), Duration::minutes(1));
        assert_eq!(bump_cooldown(false), Duration::hours(4));
    }
}
