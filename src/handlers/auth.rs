use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::services::TokenService;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub shop_id: String,
}

/// Landing point for the platform's OAuth redirect: trades the authorization
/// code for the first token pair and persists it.
#[utoipa::path(
    get,
    path = "/auth/callback",
    tag = "auth",
    params(
        ("code" = String, Query, description = "Authorization code from the platform redirect"),
        ("shop_id" = String, Query, description = "Shop being authorized")
    ),
    responses(
        (status = 200, description = "Shop authorized, token stored"),
        (status = 502, description = "Code exchange failed")
    )
)]
pub async fn oauth_callback(
    token_service: web::Data<TokenService>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse> {
    match token_service
        .exchange_code(&query.code, &query.shop_id)
        .await
    {
        Ok(token) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "shop_id": token.shop_id,
                "expires_at": token.expires_at
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").route("/callback", web::get().to(oauth_callback)));
}
