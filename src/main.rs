use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use shopdesk_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::ShopeeClient,
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let shopee_client = ShopeeClient::new(config.shopee.clone());
    let sandbox = config.shopee.is_sandbox();

    let token_service = TokenService::new(pool.clone(), shopee_client);
    let order_service = OrderService::new(pool.clone());
    let wallet_service = WalletService::new(pool.clone());
    let automation_service = AutomationService::new(pool.clone());
    let product_service = ProductService::new(pool.clone(), token_service.clone());
    let sync_service = SyncService::new(pool.clone(), token_service.clone(), config.sync.clone());

    // Background automation: auto-bump and periodic order/product sync.
    tasks::spawn_all(
        automation_service.clone(),
        product_service.clone(),
        sync_service.clone(),
        sandbox,
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let shopee_config = config.shopee.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(shopee_config.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(wallet_service.clone()))
            .app_data(web::Data::new(automation_service.clone()))
            .app_data(web::Data::new(sync_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .configure(handlers::auth_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::order_config)
                    .configure(handlers::product_config)
                    .configure(handlers::wallet_config)
                    .configure(handlers::automation_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
