use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::OrderQuery;
use crate::services::OrderService;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("status" = Option<String>, Query, description = "Order status filter"),
        ("create_time_from" = Option<i64>, Query, description = "Creation time lower bound, epoch seconds"),
        ("create_time_to" = Option<i64>, Query, description = "Creation time upper bound, epoch seconds")
    ),
    responses(
        (status = 200, description = "Paged local order listing")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match order_service.get_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/orders").route("", web::get().to(get_orders)));
}
