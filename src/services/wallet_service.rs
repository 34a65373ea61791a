use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, PaginationParams, WalletQuery, WalletTransaction};

#[derive(Clone)]
pub struct WalletService {
    pool: SqlitePool,
}

impl WalletService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_transactions(
        &self,
        query: &WalletQuery,
    ) -> AppResult<PaginatedResponse<WalletTransaction>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset() as i64;
        let limit = params.get_per_page() as i64;

        let (total, rows) = match &query.kind {
            Some(kind) => {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM wallet_transactions WHERE kind = ?")
                        .bind(kind)
                        .fetch_one(&self.pool)
                        .await?;
                let rows = sqlx::query_as::<_, WalletTransaction>(
                    "SELECT * FROM wallet_transactions WHERE kind = ?
                     ORDER BY transaction_date DESC LIMIT ? OFFSET ?",
                )
                .bind(kind)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wallet_transactions")
                    .fetch_one(&self.pool)
                    .await?;
                let rows = sqlx::query_as::<_, WalletTransaction>(
                    "SELECT * FROM wallet_transactions
                     ORDER BY transaction_date DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, rows)
            }
        };

        Ok(PaginatedResponse::new(
            rows,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }
}
