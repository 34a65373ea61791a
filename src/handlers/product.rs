use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::{
    AutoBumpRequest, BumpRequest, ProductQuery, UpdatePriceRequest, UpdateStockRequest,
};
use crate::services::ProductService;

#[utoipa::path(
    get,
    path = "/products",
    tag = "product",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paged local product listing")
    )
)]
pub async fn get_products(
    product_service: web::Data<ProductService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    match product_service.get_products(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products/{item_id}/price",
    tag = "product",
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Price pushed to the platform and mirrored locally"),
        (status = 404, description = "Unknown product or model")
    )
)]
pub async fn update_price(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
    body: web::Json<UpdatePriceRequest>,
) -> Result<HttpResponse> {
    let item_id = path.into_inner();
    match product_service
        .update_price(item_id, body.model_id, body.price)
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products/{item_id}/stock",
    tag = "product",
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock pushed to the platform and mirrored locally"),
        (status = 404, description = "Unknown product or model")
    )
)]
pub async fn update_stock(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
    body: web::Json<UpdateStockRequest>,
) -> Result<HttpResponse> {
    let item_id = path.into_inner();
    match product_service
        .update_stock(item_id, body.model_id, body.stock)
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products/{item_id}/auto-bump",
    tag = "product",
    request_body = AutoBumpRequest,
    responses(
        (status = 200, description = "Auto-bump flag updated"),
        (status = 404, description = "Unknown product")
    )
)]
pub async fn set_auto_bump(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
    body: web::Json<AutoBumpRequest>,
) -> Result<HttpResponse> {
    let item_id = path.into_inner();
    match product_service.set_auto_bump(item_id, body.enabled).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products/bump",
    tag = "product",
    request_body = BumpRequest,
    responses(
        (status = 200, description = "Boost report: per-item successes and failures")
    )
)]
pub async fn bump_products(
    product_service: web::Data<ProductService>,
    body: web::Json<BumpRequest>,
) -> Result<HttpResponse> {
    match product_service.bump_products(&body.item_ids).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(get_products))
            .route("/bump", web::post().to(bump_products))
            .route("/{item_id}/price", web::post().to(update_price))
            .route("/{item_id}/stock", web::post().to(update_stock))
            .route("/{item_id}/auto-bump", web::post().to(set_auto_bump)),
    );
}
