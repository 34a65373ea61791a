use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::handlers::admin::SyncOrdersRequest;
use crate::models::*;
use crate::services::sync_service::{SyncFailure, SyncReport};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::oauth_callback,
        handlers::order::get_orders,
        handlers::product::get_products,
        handlers::product::update_price,
        handlers::product::update_stock,
        handlers::product::set_auto_bump,
        handlers::product::bump_products,
        handlers::wallet::get_summary,
        handlers::wallet::get_transactions,
        handlers::automation::get_settings,
        handlers::automation::update_setting,
        handlers::admin::sync_orders,
        handlers::admin::sync_products,
        handlers::admin::shipping_document,
    ),
    components(
        schemas(
            Order,
            OrderResponse,
            OrderQuery,
            OrderStatus,
            Product,
            ProductResponse,
            ProductQuery,
            Variant,
            UpdatePriceRequest,
            UpdateStockRequest,
            AutoBumpRequest,
            BumpRequest,
            WalletTransaction,
            WalletTransactionKind,
            WalletSummary,
            WalletQuery,
            AutomationSetting,
            UpdateAutomationRequest,
            SyncReport,
            SyncFailure,
            SyncOrdersRequest,
        )
    ),
    tags(
        (name = "auth", description = "Shop authorization"),
        (name = "order", description = "Order mirror API"),
        (name = "product", description = "Product management API"),
        (name = "wallet", description = "Wallet / escrow API"),
        (name = "automation", description = "Automation flags API"),
        (name = "admin", description = "Manual sync triggers and documents"),
    ),
    info(
        title = "ShopDesk Backend API",
        version = "1.0.0",
        description = "Seller dashboard backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
