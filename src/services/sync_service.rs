use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::config::SyncConfig;
use crate::error::{AppError, AppResult};
use crate::external::{
    ITEM_BASE_INFO_BATCH_MAX, ITEM_LIST_PAGE_SIZE, ORDER_DETAIL_BATCH_MAX, ORDER_LIST_PAGE_SIZE,
    ORDER_LIST_WINDOW_MAX_SECS, PATH_ITEM_BASE_INFO, PATH_ITEM_LIST, PATH_MODEL_LIST,
    PATH_ORDER_DETAIL, PATH_ORDER_LIST,
};
use crate::models::{OrderStatus, Variant, WalletSummary, display_price, total_stock};
use crate::services::TokenService;

/// Outcome of one batch reconciliation. A failed item never aborts the batch;
/// it lands here instead.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    pub synced: usize,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncFailure {
    pub key: String,
    pub error: String,
}

impl SyncReport {
    pub(crate) fn record_ok(&mut self) {
        self.synced += 1;
    }

    pub(crate) fn record_failure(&mut self, key: &str, error: impl std::fmt::Display) {
        self.failures.push(SyncFailure {
            key: key.to_string(),
            error: error.to_string(),
        });
    }
}

/// Reconciles remote order/product state into local storage. All writes are
/// upserts by natural key, so re-running a sync with no remote changes is a
/// no-op.
#[derive(Clone)]
pub struct SyncService {
    pool: SqlitePool,
    tokens: TokenService,
    sync_config: SyncConfig,
}

impl SyncService {
    pub fn new(pool: SqlitePool, tokens: TokenService, sync_config: SyncConfig) -> Self {
        Self {
            pool,
            tokens,
            sync_config,
        }
    }

    // ---- orders ----

    /// Sync the given orders, or discover recently-updated ones when no list is
    /// passed (webhooks pass explicit sns, the scheduler passes none).
    pub async fn sync_orders(&self, order_sns: Option<Vec<String>>) -> AppResult<SyncReport> {
        let shop_id = self.current_shop_id().await?;
        let sns = match order_sns {
            Some(list) => list,
            None => self.discover_order_sns().await?,
        };

        let mut report = SyncReport::default();
        for chunk in sns.chunks(ORDER_DETAIL_BATCH_MAX) {
            match self.fetch_order_details(chunk).await {
                Ok(details) => {
                    let returned: HashSet<String> = details
                        .iter()
                        .filter_map(|d| d["order_sn"].as_str().map(str::to_string))
                        .collect();
                    for sn in chunk {
                        if !returned.contains(sn) {
                            report.record_failure(sn, "not returned by order detail endpoint");
                        }
                    }
                    self.apply_order_details(&shop_id, &details, &mut report)
                        .await;
                }
                Err(e) => {
                    log::error!("Order detail batch failed: {e}");
                    for sn in chunk {
                        report.record_failure(sn, &e);
                    }
                }
            }
        }

        log::info!(
            "Order sync complete: {} synced, {} failed",
            report.synced,
            report.failures.len()
        );
        Ok(report)
    }

    /// Walk the lookback in windows the remote accepts and page each window by
    /// cursor, collecting candidate order sns.
    async fn discover_order_sns(&self) -> AppResult<Vec<String>> {
        let now = Utc::now().timestamp();
        let from = now - self.sync_config.order_lookback_days * 24 * 3600;

        let mut sns = Vec::new();
        let mut seen = HashSet::new();
        for (window_from, window_to) in time_windows(from, now, ORDER_LIST_WINDOW_MAX_SECS) {
            let mut cursor = String::new();
            loop {
                let mut params = vec![
                    ("time_range_field", "update_time".to_string()),
                    ("time_from", window_from.to_string()),
                    ("time_to", window_to.to_string()),
                    ("page_size", ORDER_LIST_PAGE_SIZE.to_string()),
                ];
                if !cursor.is_empty() {
                    params.push(("cursor", cursor.clone()));
                }

                let response = self.tokens.authed_get(PATH_ORDER_LIST, &params).await?;
                if let Some(list) = response["order_list"].as_array() {
                    for entry in list {
                        if let Some(sn) = entry["order_sn"].as_str()
                            && seen.insert(sn.to_string())
                        {
                            sns.push(sn.to_string());
                        }
                    }
                }

                let more = response["more"].as_bool().unwrap_or(false);
                cursor = response["next_cursor"].as_str().unwrap_or("").to_string();
                if !more || cursor.is_empty() {
                    break;
                }
            }
        }

        log::debug!("Discovered {} candidate orders", sns.len());
        Ok(sns)
    }

    async fn fetch_order_details(&self, sns: &[String]) -> AppResult<Vec<Value>> {
        let params = vec![
            ("order_sn_list", sns.join(",")),
            (
                "response_optional_fields",
                "buyer_username,item_list,total_amount,order_status,create_time".to_string(),
            ),
        ];
        let response = self.tokens.authed_get(PATH_ORDER_DETAIL, &params).await?;
        Ok(response["order_list"]
            .as_array()
            .cloned()
            .unwrap_or_default())
    }

    /// Map and upsert a batch of order detail payloads, recording per-order
    /// failures instead of aborting.
    pub async fn apply_order_details(
        &self,
        shop_id: &str,
        details: &[Value],
        report: &mut SyncReport,
    ) {
        for detail in details {
            let key = detail["order_sn"].as_str().unwrap_or("<missing order_sn>");
            match map_order_detail(shop_id, detail) {
                Ok(mapped) => match self.upsert_order(&mapped).await {
                    Ok(()) => report.record_ok(),
                    Err(e) => {
                        log::error!("Failed to upsert order {}: {e}", mapped.order_sn);
                        report.record_failure(key, e);
                    }
                },
                Err(e) => {
                    log::error!("Failed to map order detail {key}: {e}");
                    report.record_failure(key, e);
                }
            }
        }
    }

    async fn upsert_order(&self, order: &MappedOrder) -> AppResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO orders (order_sn, shop_id, buyer_name, product_names, total_amount, status, create_time, raw, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(order_sn) DO UPDATE SET
                shop_id = excluded.shop_id,
                buyer_name = excluded.buyer_name,
                product_names = excluded.product_names,
                total_amount = excluded.total_amount,
                status = excluded.status,
                create_time = excluded.create_time,
                raw = excluded.raw,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&order.order_sn)
        .bind(&order.shop_id)
        .bind(&order.buyer_name)
        .bind(&order.product_names)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.create_time)
        .bind(order.raw.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- products ----

    pub async fn sync_products(&self) -> AppResult<SyncReport> {
        let item_ids = self.discover_item_ids().await?;

        let mut report = SyncReport::default();
        for chunk in item_ids.chunks(ITEM_BASE_INFO_BATCH_MAX) {
            let base_infos = match self.fetch_item_base_info(chunk).await {
                Ok(infos) => infos,
                Err(e) => {
                    log::error!("Item base info batch failed: {e}");
                    for id in chunk {
                        report.record_failure(&id.to_string(), &e);
                    }
                    continue;
                }
            };

            // Model/variant fetches within a batch run concurrently; each item
            // fails on its own.
            let results = futures_util::future::join_all(
                base_infos.iter().map(|info| self.sync_one_product(info)),
            )
            .await;
            for (info, result) in base_infos.iter().zip(results) {
                let key = info["item_id"]
                    .as_i64()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<missing item_id>".to_string());
                match result {
                    Ok(()) => report.record_ok(),
                    Err(e) => {
                        log::error!("Failed to sync product {key}: {e}");
                        report.record_failure(&key, e);
                    }
                }
            }
        }

        log::info!(
            "Product sync complete: {} synced, {} failed",
            report.synced,
            report.failures.len()
        );
        Ok(report)
    }

    async fn discover_item_ids(&self) -> AppResult<Vec<i64>> {
        let mut ids = Vec::new();
        let mut offset: i64 = 0;
        loop {
            let params = vec![
                ("offset", offset.to_string()),
                ("page_size", ITEM_LIST_PAGE_SIZE.to_string()),
                ("item_status", "NORMAL".to_string()),
            ];
            let response = self.tokens.authed_get(PATH_ITEM_LIST, &params).await?;
            if let Some(items) = response["item"].as_array() {
                for item in items {
                    if let Some(id) = item["item_id"].as_i64() {
                        ids.push(id);
                    }
                }
            }

            if !response["has_next_page"].as_bool().unwrap_or(false) {
                break;
            }
            offset = response["next_offset"].as_i64().unwrap_or(offset + ITEM_LIST_PAGE_SIZE);
        }
        Ok(ids)
    }

    async fn fetch_item_base_info(&self, item_ids: &[i64]) -> AppResult<Vec<Value>> {
        let id_list = item_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let params = vec![("item_id_list", id_list)];
        let response = self.tokens.authed_get(PATH_ITEM_BASE_INFO, &params).await?;
        Ok(response["item_list"]
            .as_array()
            .cloned()
            .unwrap_or_default())
    }

    /// Base info says whether an item has models; variant prices/stocks come
    /// from a second round-trip to the model list endpoint.
    async fn sync_one_product(&self, base_info: &Value) -> AppResult<()> {
        let base = map_item_base_info(base_info)?;

        let variants = if base.has_model {
            let params = vec![("item_id", base.item_id.to_string())];
            let response = self.tokens.authed_get(PATH_MODEL_LIST, &params).await?;
            map_model_list(&response)
        } else {
            Vec::new()
        };

        let (price, stock) = if variants.is_empty() {
            (base.price, base.stock)
        } else {
            (display_price(&variants).unwrap_or(base.price), total_stock(&variants))
        };

        self.upsert_product(base.item_id, &base.name, price, stock, &variants, base.has_model)
            .await
    }

    pub async fn upsert_product(
        &self,
        item_id: i64,
        name: &str,
        price: f64,
        stock: i64,
        variants: &[Variant],
        has_model: bool,
    ) -> AppResult<()> {
        let now = Utc::now();
        let variants_json = serde_json::to_string(variants)?;
        // is_auto_bump and last_bumped_at are local state; sync never touches them.
        sqlx::query(
            r#"
            INSERT INTO products (shopee_item_id, name, price, stock, variants, has_model, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(shopee_item_id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                stock = excluded.stock,
                variants = excluded.variants,
                has_model = excluded.has_model,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(item_id)
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(variants_json)
        .bind(has_model)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- wallet ----

    /// Derive released / on-hold / total-earned balances. Ledger rows are the
    /// source of truth once any exist; until then order-status bucketing
    /// bootstraps the numbers.
    pub async fn sync_wallet(&self) -> AppResult<WalletSummary> {
        let ledger_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wallet_transactions")
            .fetch_one(&self.pool)
            .await?;

        if ledger_count > 0 {
            let released: f64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(amount), 0.0) FROM wallet_transactions
                 WHERE kind = 'Release' AND status = 'Completed'",
            )
            .fetch_one(&self.pool)
            .await?;
            let on_hold: f64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(ABS(amount)), 0.0) FROM wallet_transactions
                 WHERE kind = 'Hold' AND status != 'Failed'",
            )
            .fetch_one(&self.pool)
            .await?;
            return Ok(WalletSummary {
                released,
                on_hold,
                total_earned: released + on_hold,
            });
        }

        let released: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE status IN (?, ?)",
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(OrderStatus::ToConfirmReceive.as_str())
        .fetch_one(&self.pool)
        .await?;

        let on_hold: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE status IN (?, ?, ?)",
        )
        .bind(OrderStatus::ReadyToShip.as_str())
        .bind(OrderStatus::Processed.as_str())
        .bind(OrderStatus::Shipped.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(WalletSummary {
            released,
            on_hold,
            total_earned: released + on_hold,
        })
    }

    async fn current_shop_id(&self) -> AppResult<String> {
        let token = self.tokens.get_valid_token().await?.ok_or_else(|| {
            AppError::AuthError("no valid shop token; re-authorization required".to_string())
        })?;
        Ok(token.shop_id)
    }
}

/// Split [from, to] into consecutive windows no wider than `max_secs`, newest
/// first. The order list endpoint rejects anything wider.
fn time_windows(from: i64, to: i64, max_secs: i64) -> Vec<(i64, i64)> {
    let mut windows = Vec::new();
    let mut end = to;
    while end > from {
        let start = (end - max_secs).max(from);
        windows.push((start, end));
        end = start;
    }
    windows
}

struct MappedOrder {
    order_sn: String,
    shop_id: String,
    buyer_name: String,
    product_names: String,
    total_amount: f64,
    status: OrderStatus,
    create_time: i64,
    raw: Value,
}

fn map_order_detail(shop_id: &str, detail: &Value) -> AppResult<MappedOrder> {
    let order_sn = detail["order_sn"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError("order detail missing order_sn".to_string()))?;

    let product_names = detail["item_list"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["item_name"].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Ok(MappedOrder {
        order_sn: order_sn.to_string(),
        shop_id: shop_id.to_string(),
        buyer_name: detail["buyer_username"].as_str().unwrap_or("").to_string(),
        product_names,
        total_amount: detail["total_amount"].as_f64().unwrap_or(0.0),
        status: OrderStatus::from_remote(detail["order_status"].as_str().unwrap_or("")),
        create_time: detail["create_time"].as_i64().unwrap_or(0),
        raw: detail.clone(),
    })
}

struct BaseItem {
    item_id: i64,
    name: String,
    price: f64,
    stock: i64,
    has_model: bool,
}

fn map_item_base_info(info: &Value) -> AppResult<BaseItem> {
    let item_id = info["item_id"]
        .as_i64()
        .ok_or_else(|| AppError::ValidationError("item base info missing item_id".to_string()))?;

    let price = info["price_info"][0]["current_price"].as_f64().unwrap_or(0.0);
    let stock = info["stock_info_v2"]["summary_info"]["total_available_stock"]
        .as_i64()
        .unwrap_or(0);

    Ok(BaseItem {
        item_id,
        name: info["item_name"].as_str().unwrap_or("").to_string(),
        price,
        stock,
        has_model: info["has_model"].as_bool().unwrap_or(false),
    })
}

fn map_model_list(response: &Value) -> Vec<Variant> {
    response["model"]
        .as_array()
        .map(|models| {
            models
                .iter()
                .filter_map(|m| {
                    let model_id = m["model_id"].as_i64()?;
                    Some(Variant {
                        model_id,
                        name: m["model_name"].as_str().unwrap_or("").to_string(),
                        price: m["price_info"][0]["current_price"].as_f64().unwrap_or(0.0),
                        stock: m["stock_info_v2"]["summary_info"]["total_available_stock"]
                            .as_i64()
                            .unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShopeeConfig, SyncConfig};
    use crate::external::ShopeeClient;
    use crate::models::Order;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> SyncService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let client = ShopeeClient::new(ShopeeConfig {
            partner_id: "1000".to_string(),
            partner_key: "k".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            environment: "production".to_string(),
        });
        let tokens = TokenService::new(pool.clone(), client);
        SyncService::new(pool, tokens, SyncConfig::default())
    }

    fn order_detail(sn: &str, status: &str, amount: f64) -> Value {
        serde_json::json!({
            "order_sn": sn,
            "buyer_username": "buyer01",
            "order_status": status,
            "total_amount": amount,
            "create_time": 1_700_000_000,
            "item_list": [
                {"item_name": "Blue Shirt"},
                {"item_name": "Red Shirt"}
            ]
        })
    }

    async fn order_rows(service: &SyncService) -> Vec<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY order_sn")
            .fetch_all(&service.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_apply_order_details_upserts() {
        let service = test_service().await;
        let mut report = SyncReport::default();
        service
            .apply_order_details("123", &[order_detail("SN1", "READY_TO_SHIP", 25.0)], &mut report)
            .await;

        assert_eq!(report.synced, 1);
        assert!(report.failures.is_empty());

        let rows = order_rows(&service).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_sn, "SN1");
        assert_eq!(rows[0].status, "READY_TO_SHIP");
        assert_eq!(rows[0].product_names, "Blue Shirt, Red Shirt");
        assert_eq!(rows[0].buyer_name, "buyer01");
    }

    #[tokio::test]
    async fn test_order_sync_is_idempotent() {
        let service = test_service().await;
        let detail = order_detail("SN1", "SHIPPED", 10.0);

        let mut report = SyncReport::default();
        service
            .apply_order_details("123", std::slice::from_ref(&detail), &mut report)
            .await;
        let first = order_rows(&service).await;

        let mut report = SyncReport::default();
        service
            .apply_order_details("123", std::slice::from_ref(&detail), &mut report)
            .await;
        let second = order_rows(&service).await;

        assert_eq!(second.len(), 1);
        assert_eq!(first[0].order_sn, second[0].order_sn);
        assert_eq!(first[0].status, second[0].status);
        assert_eq!(first[0].total_amount, second[0].total_amount);
        assert_eq!(first[0].raw, second[0].raw);
    }

    #[tokio::test]
    async fn test_status_change_updates_not_duplicates() {
        let service = test_service().await;
        let mut report = SyncReport::default();
        service
            .apply_order_details("123", &[order_detail("SN1", "READY_TO_SHIP", 10.0)], &mut report)
            .await;
        service
            .apply_order_details("123", &[order_detail("SN1", "CANCELLED", 10.0)], &mut report)
            .await;

        let rows = order_rows(&service).await;
        assert_eq!(rows.len(), 1);
        // Cancellation is a status transition, not a deletion.
        assert_eq!(rows[0].status, "CANCELLED");
    }

    #[tokio::test]
    async fn test_partial_failure_reports_and_continues() {
        let service = test_service().await;
        let details = vec![
            order_detail("SN1", "COMPLETED", 5.0),
            serde_json::json!({"buyer_username": "x"}), // no order_sn
            order_detail("SN2", "UNPAID", 7.0),
            serde_json::json!({"order_sn": ""}), // empty order_sn
            order_detail("SN3", "SHIPPED", 9.0),
        ];

        let mut report = SyncReport::default();
        service.apply_order_details("123", &details, &mut report).await;

        assert_eq!(report.synced, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(order_rows(&service).await.len(), 3);
    }

    #[tokio::test]
    async fn test_product_upsert_preserves_local_flags() {
        let service = test_service().await;
        service
            .upsert_product(111, "Shirt", 9.9, 3, &[], false)
            .await
            .unwrap();
        sqlx::query("UPDATE products SET is_auto_bump = 1 WHERE shopee_item_id = 111")
            .execute(&service.pool)
            .await
            .unwrap();

        service
            .upsert_product(111, "Shirt v2", 8.8, 5, &[], false)
            .await
            .unwrap();

        let (name, is_auto_bump): (String, bool) = sqlx::query_as(
            "SELECT name, is_auto_bump FROM products WHERE shopee_item_id = 111",
        )
        .fetch_one(&service.pool)
        .await
        .unwrap();
        assert_eq!(name, "Shirt v2");
        assert!(is_auto_bump);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&service.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_wallet_falls_back_to_order_buckets() {
        let service = test_service().await;
        let mut report = SyncReport::default();
        service
            .apply_order_details(
                "123",
                &[
                    order_detail("SN1", "COMPLETED", 10.0),
                    order_detail("SN2", "TO_CONFIRM_RECEIVE", 5.0),
                    order_detail("SN3", "SHIPPED", 3.0),
                    order_detail("SN4", "READY_TO_SHIP", 2.0),
                    order_detail("SN5", "CANCELLED", 100.0),
                ],
                &mut report,
            )
            .await;

        let summary = service.sync_wallet().await.unwrap();
        assert_eq!(summary.released, 15.0);
        assert_eq!(summary.on_hold, 5.0);
        assert_eq!(summary.total_earned, 20.0);
    }

    #[tokio::test]
    async fn test_wallet_ledger_takes_precedence() {
        let service = test_service().await;
        let mut report = SyncReport::default();
        service
            .apply_order_details("123", &[order_detail("SN1", "COMPLETED", 999.0)], &mut report)
            .await;

        for (kind, amount, status) in [
            ("Release", 40.0, "Completed"),
            ("Hold", -10.0, "Pending"),
            ("Hold", -5.0, "Failed"),
        ] {
            sqlx::query(
                "INSERT INTO wallet_transactions (transaction_date, kind, amount, status)
                 VALUES (datetime('now'), ?, ?, ?)",
            )
            .bind(kind)
            .bind(amount)
            .bind(status)
            .execute(&service.pool)
            .await
            .unwrap();
        }

        let summary = service.sync_wallet().await.unwrap();
        assert_eq!(summary.released, 40.0);
        assert_eq!(summary.on_hold, 10.0);
        assert_eq!(summary.total_earned, 50.0);
    }

    #[test]
    fn test_time_windows_respect_cap_and_cover_range() {
        let day = 24 * 3600;
        let windows = time_windows(0, 30 * day, 15 * day);
        assert_eq!(windows.len(), 2);
        for (from, to) in &windows {
            assert!(to - from <= 15 * day);
        }
        assert_eq!(windows.first().unwrap().1, 30 * day);
        assert_eq!(windows.last().unwrap().0, 0);

        // Lookback smaller than the cap is a single window.
        let windows = time_windows(0, 7 * day, 15 * day);
        assert_eq!(windows, vec![(0, 7 * day)]);
    }

    #[test]
    fn test_map_model_list_orders_variants() {
        let response = serde_json::json!({
            "model": [
                {"model_id": 10, "model_name": "S", "price_info": [{"current_price": 9.9}],
                 "stock_info_v2": {"summary_info": {"total_available_stock": 3}}},
                {"model_id": 11, "model_name": "M", "price_info": [{"current_price": 12.0}],
                 "stock_info_v2": {"summary_info": {"total_available_stock": 4}}}
            ]
        });
        let variants = map_model_list(&response);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].model_id, 10);
        assert_eq!(display_price(&variants), Some(9.9));
        assert_eq!(total_stock(&variants), 7);
    }
}
