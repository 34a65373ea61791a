use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::WalletQuery;
use crate::services::{SyncService, WalletService};

#[utoipa::path(
    get,
    path = "/wallet/summary",
    tag = "wallet",
    responses(
        (status = 200, description = "Released / on-hold / total-earned balances")
    )
)]
pub async fn get_summary(sync_service: web::Data<SyncService>) -> Result<HttpResponse> {
    match sync_service.sync_wallet().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/transactions",
    tag = "wallet",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("kind" = Option<String>, Query, description = "Transaction kind filter")
    ),
    responses(
        (status = 200, description = "Paged wallet ledger")
    )
)]
pub async fn get_transactions(
    wallet_service: web::Data<WalletService>,
    query: web::Query<WalletQuery>,
) -> Result<HttpResponse> {
    match wallet_service.get_transactions(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("/summary", web::get().to(get_summary))
            .route("/transactions", web::get().to(get_transactions)),
    );
}
