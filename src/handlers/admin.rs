use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::external::PATH_SHIPPING_DOCUMENT;
use crate::services::{SyncService, TokenService};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncOrdersRequest {
    /// Explicit orders to sync; omit to discover recently updated ones.
    #[serde(default)]
    pub order_sn_list: Option<Vec<String>>,
}

#[utoipa::path(
    post,
    path = "/admin/sync/orders",
    tag = "admin",
    request_body = SyncOrdersRequest,
    responses(
        (status = 200, description = "Sync report: per-order successes and failures"),
        (status = 401, description = "No valid shop token")
    )
)]
pub async fn sync_orders(
    sync_service: web::Data<SyncService>,
    body: Option<web::Json<SyncOrdersRequest>>,
) -> Result<HttpResponse> {
    let order_sns = body.and_then(|b| b.into_inner().order_sn_list);
    match sync_service.sync_orders(order_sns).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/sync/products",
    tag = "admin",
    responses(
        (status = 200, description = "Sync report: per-product successes and failures"),
        (status = 401, description = "No valid shop token")
    )
)]
pub async fn sync_products(sync_service: web::Data<SyncService>) -> Result<HttpResponse> {
    match sync_service.sync_products().await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Shipping document PDFs stream through unchanged, with the remote content
/// type and filename preserved.
#[utoipa::path(
    get,
    path = "/admin/orders/{order_sn}/shipping-document",
    tag = "admin",
    responses(
        (status = 200, description = "Shipping document binary", content_type = "application/pdf"),
        (status = 502, description = "Remote error")
    )
)]
pub async fn shipping_document(
    token_service: web::Data<TokenService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let order_sn = path.into_inner();
    let body = json!({
        "shipping_document_type": "NORMAL_AIR_WAYBILL",
        "order_list": [ { "order_sn": order_sn } ]
    });

    match token_service.authed_download(PATH_SHIPPING_DOCUMENT, &body).await {
        Ok(doc) => Ok(HttpResponse::Ok()
            .content_type(doc.content_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", doc.filename),
            ))
            .body(doc.bytes)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/sync/orders", web::post().to(sync_orders))
            .route("/sync/products", web::post().to(sync_products))
            .route(
                "/orders/{order_sn}/shipping-document",
                web::get().to(shipping_document),
            ),
    );
}
