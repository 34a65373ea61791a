use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::models::{
    RULE_AUTO_BUMP, RULE_AUTO_SYNC_ORDERS, RULE_AUTO_SYNC_PRODUCTS, UpdateAutomationRequest,
};
use crate::services::AutomationService;

const KNOWN_RULES: [&str; 3] = [RULE_AUTO_BUMP, RULE_AUTO_SYNC_ORDERS, RULE_AUTO_SYNC_PRODUCTS];

#[utoipa::path(
    get,
    path = "/automation",
    tag = "automation",
    responses(
        (status = 200, description = "All automation flags")
    )
)]
pub async fn get_settings(automation_service: web::Data<AutomationService>) -> Result<HttpResponse> {
    match automation_service.get_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/automation/{id}",
    tag = "automation",
    request_body = UpdateAutomationRequest,
    responses(
        (status = 200, description = "Flag updated"),
        (status = 400, description = "Unknown rule id")
    )
)]
pub async fn update_setting(
    automation_service: web::Data<AutomationService>,
    path: web::Path<String>,
    body: web::Json<UpdateAutomationRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !KNOWN_RULES.contains(&id.as_str()) {
        return Ok(
            AppError::ValidationError(format!("unknown automation rule: {id}")).error_response(),
        );
    }

    match automation_service.set_enabled(&id, body.enabled).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn automation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/automation")
            .route("", web::get().to(get_settings))
            .route("/{id}", web::put().to(update_setting)),
    );
}
