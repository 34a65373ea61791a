use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::{error, info, warn};
use serde_json::json;

use crate::config::ShopeeConfig;
use crate::external::signature;
use crate::services::SyncService;

/// Push codes the platform sends for order lifecycle changes.
const PUSH_CODE_ORDER_STATUS: i64 = 3;
const PUSH_CODE_TRACKING_NO: i64 = 4;

/// Shopee push webhook.
///
/// Verifies the HMAC in the Authorization header (computed over `url|body`
/// with the partner key), then feeds affected orders through the normal
/// per-order sync path.
pub async fn shopee_webhook(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<ShopeeConfig>,
    sync_service: web::Data<SyncService>,
) -> Result<HttpResponse> {
    let received = match req.headers().get("Authorization") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            warn!("Missing Authorization header on webhook push");
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Missing Authorization header"
            })));
        }
    };

    let payload = std::str::from_utf8(&body).map_err(|_| {
        error!("Invalid UTF-8 in webhook payload");
        actix_web::error::ErrorBadRequest("Invalid payload encoding")
    })?;

    let conn = req.connection_info();
    let url = format!("{}://{}{}", conn.scheme(), conn.host(), req.uri());
    match signature::verify_push_signature(&config.partner_key, &url, payload, received) {
        Ok(true) => {}
        Ok(false) => {
            warn!("Webhook push signature mismatch");
            return Ok(HttpResponse::Unauthorized().json(json!({
                "error": "Invalid signature"
            })));
        }
        Err(e) => {
            error!("Webhook signature verification failed: {e}");
            return Ok(HttpResponse::Unauthorized().json(json!({
                "error": "Invalid signature"
            })));
        }
    }

    let event: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!("Webhook payload is not JSON: {e}");
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid payload"
            })));
        }
    };

    let code = event["code"].as_i64().unwrap_or(0);
    let order_sn = event["data"]["ordersn"]
        .as_str()
        .or_else(|| event["data"]["order_sn"].as_str());

    match (code, order_sn) {
        (PUSH_CODE_ORDER_STATUS | PUSH_CODE_TRACKING_NO, Some(sn)) => {
            info!("Webhook push {code} for order {sn}");
            match sync_service.sync_orders(Some(vec![sn.to_string()])).await {
                Ok(report) if report.failures.is_empty() => {
                    Ok(HttpResponse::Ok().json(json!({ "received": true })))
                }
                Ok(report) => {
                    // Acknowledge anyway; the periodic sync will pick it up.
                    error!("Webhook-triggered sync had failures: {:?}", report.failures);
                    Ok(HttpResponse::Ok().json(json!({
                        "received": true,
                        "error": "sync incomplete"
                    })))
                }
                Err(e) => {
                    error!("Webhook-triggered sync failed: {e}");
                    Ok(HttpResponse::Ok().json(json!({
                        "received": true,
                        "error": format!("Processing failed: {e}")
                    })))
                }
            }
        }
        _ => {
            info!("Unhandled webhook push code: {code}");
            Ok(HttpResponse::Ok().json(json!({ "received": true })))
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/shopee", web::post().to(shopee_webhook)));
}
