use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::external::{BOOST_BATCH_MAX, PATH_BOOST_ITEM, PATH_UPDATE_PRICE, PATH_UPDATE_STOCK};
use crate::models::{
    PaginatedResponse, PaginationParams, Product, ProductQuery, ProductResponse, Variant,
    display_price, total_stock,
};
use crate::services::sync_service::SyncReport;
use crate::services::TokenService;

#[derive(Clone)]
pub struct ProductService {
    pool: SqlitePool,
    tokens: TokenService,
}

impl ProductService {
    pub fn new(pool: SqlitePool, tokens: TokenService) -> Self {
        Self { pool, tokens }
    }

    pub async fn get_products(
        &self,
        query: &ProductQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset() as i64;
        let limit = params.get_per_page() as i64;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY shopee_item_id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    pub async fn get_by_item_id(&self, item_id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE shopee_item_id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {item_id}")))
    }

    /// Push a price change to the platform, then mirror it locally. For items
    /// without models the remote expects model_id 0.
    pub async fn update_price(
        &self,
        item_id: i64,
        model_id: Option<i64>,
        price: f64,
    ) -> AppResult<ProductResponse> {
        if price <= 0.0 {
            return Err(AppError::ValidationError(
                "price must be positive".to_string(),
            ));
        }
        let product = self.get_by_item_id(item_id).await?;
        let model_id = model_id.unwrap_or(0);

        let body = build_price_payload(item_id, model_id, price);
        self.tokens.authed_post(PATH_UPDATE_PRICE, &body).await?;

        self.store_price_update(&product, model_id, price).await
    }

    pub async fn update_stock(
        &self,
        item_id: i64,
        model_id: Option<i64>,
        stock: i64,
    ) -> AppResult<ProductResponse> {
        if stock < 0 {
            return Err(AppError::ValidationError(
                "stock must not be negative".to_string(),
            ));
        }
        let product = self.get_by_item_id(item_id).await?;
        let model_id = model_id.unwrap_or(0);

        let body = build_stock_payload(item_id, model_id, stock);
        self.tokens.authed_post(PATH_UPDATE_STOCK, &body).await?;

        self.store_stock_update(&product, model_id, stock).await
    }

    /// Local mirror of a confirmed remote price change: the touched variant
    /// gets the new price, the others keep theirs, and the display price
    /// follows the first variant.
    async fn store_price_update(
        &self,
        product: &Product,
        model_id: i64,
        price: f64,
    ) -> AppResult<ProductResponse> {
        let mut variants = product.parsed_variants();
        let display = if variants.is_empty() {
            price
        } else {
            if !apply_variant_price(&mut variants, model_id, price) {
                return Err(AppError::NotFound(format!(
                    "model {model_id} on product {}",
                    product.shopee_item_id
                )));
            }
            display_price(&variants).unwrap_or(price)
        };

        sqlx::query(
            "UPDATE products SET price = ?, variants = ?, updated_at = ? WHERE shopee_item_id = ?",
        )
        .bind(display)
        .bind(serde_json::to_string(&variants)?)
        .bind(Utc::now())
        .bind(product.shopee_item_id)
        .execute(&self.pool)
        .await?;

        Ok(self.get_by_item_id(product.shopee_item_id).await?.into())
    }

    async fn store_stock_update(
        &self,
        product: &Product,
        model_id: i64,
        stock: i64,
    ) -> AppResult<ProductResponse> {
        let mut variants = product.parsed_variants();
        let aggregate = if variants.is_empty() {
            stock
        } else {
            if !apply_variant_stock(&mut variants, model_id, stock) {
                return Err(AppError::NotFound(format!(
                    "model {model_id} on product {}",
                    product.shopee_item_id
                )));
            }
            total_stock(&variants)
        };

        sqlx::query(
            "UPDATE products SET stock = ?, variants = ?, updated_at = ? WHERE shopee_item_id = ?",
        )
        .bind(aggregate)
        .bind(serde_json::to_string(&variants)?)
        .bind(Utc::now())
        .bind(product.shopee_item_id)
        .execute(&self.pool)
        .await?;

        Ok(self.get_by_item_id(product.shopee_item_id).await?.into())
    }

    pub async fn set_auto_bump(&self, item_id: i64, enabled: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_auto_bump = ?, updated_at = ? WHERE shopee_item_id = ?",
        )
        .bind(enabled)
        .bind(Utc::now())
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("product {item_id}")));
        }
        Ok(())
    }

    /// Boost the given items, respecting the remote batch cap. Each batch
    /// fails independently; successful batches get their `last_bumped_at`
    /// stamped.
    pub async fn bump_products(&self, item_ids: &[i64]) -> AppResult<SyncReport> {
        let mut report = SyncReport::default();
        for chunk in item_ids.chunks(BOOST_BATCH_MAX) {
            let body = serde_json::json!({ "item_id_list": chunk });
            match self.tokens.authed_post(PATH_BOOST_ITEM, &body).await {
                Ok(_) => match self.mark_bumped(chunk).await {
                    Ok(()) => {
                        for _ in chunk {
                            report.record_ok();
                        }
                        log::info!("Boosted {} items", chunk.len());
                    }
                    Err(e) => {
                        log::error!("Recording bump timestamps failed: {e}");
                        for id in chunk {
                            report.record_failure(&id.to_string(), &e);
                        }
                    }
                },
                Err(e) => {
                    log::error!("Boost batch failed: {e}");
                    for id in chunk {
                        report.record_failure(&id.to_string(), &e);
                    }
                }
            }
        }
        Ok(report)
    }

    async fn mark_bumped(&self, item_ids: &[i64]) -> AppResult<()> {
        let now = Utc::now();
        for id in item_ids {
            sqlx::query(
                "UPDATE products SET last_bumped_at = ?, updated_at = ? WHERE shopee_item_id = ?",
            )
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Items flagged for auto-bump whose last bump is outside the cooldown.
    pub async fn eligible_auto_bump(&self, cooldown: Duration) -> AppResult<Vec<i64>> {
        let cutoff = Utc::now() - cooldown;
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT shopee_item_id FROM products
             WHERE is_auto_bump = 1 AND (last_bumped_at IS NULL OR last_bumped_at < ?)
             ORDER BY shopee_item_id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

fn build_price_payload(item_id: i64, model_id: i64, price: f64) -> Value {
    serde_json::json!({
        "item_id": item_id,
        "price_list": [
            { "model_id": model_id, "original_price": price }
        ]
    })
}

/// Stock updates always go through the model-level shape, with model_id 0 and
/// an empty location for items without models.
fn build_stock_payload(item_id: i64, model_id: i64, stock: i64) -> Value {
    serde_json::json!({
        "item_id": item_id,
        "stock_list": [
            {
                "model_id": model_id,
                "seller_stock": [
                    { "location_id": "", "stock": stock }
                ]
            }
        ]
    })
}

fn apply_variant_price(variants: &mut [Variant], model_id: i64, price: f64) -> bool {
    match variants.iter_mut().find(|v| v.model_id == model_id) {
        Some(v) => {
            v.price = price;
            true
        }
        None => false,
    }
}

fn apply_variant_stock(variants: &mut [Variant], model_id: i64, stock: i64) -> bool {
    match variants.iter_mut().find(|v| v.model_id == model_id) {
        Some(v) => {
            v.stock = stock;
            true
        }
        None => false,
    }
}
