use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::{Order, OrderQuery, OrderResponse, PaginatedResponse, PaginationParams};

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_orders(
        &self,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset() as i64;
        let limit = params.get_per_page() as i64;

        let from = query.create_time_from.unwrap_or(0);
        let to = query.create_time_to.unwrap_or(i64::MAX);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders
             WHERE (? IS NULL OR status = ?) AND create_time BETWEEN ? AND ?",
        )
        .bind(&query.status)
        .bind(&query.status)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders
             WHERE (? IS NULL OR status = ?) AND create_time BETWEEN ? AND ?
             ORDER BY create_time DESC LIMIT ? OFFSET ?",
        )
        .bind(&query.status)
        .bind(&query.status)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }
}
