pub mod admin;
pub mod auth;
pub mod automation;
pub mod order;
pub mod product;
pub mod wallet;
pub mod webhook;

pub use admin::admin_config;
pub use auth::auth_config;
pub use automation::automation_config;
pub use order::order_config;
pub use product::product_config;
pub use wallet::wallet_config;
pub use webhook::webhook_config;
