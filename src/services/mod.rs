#[cfg(test)]
pub(crate) mod test_stub;

pub mod automation_service;
pub mod order_service;
pub mod product_service;
pub mod sync_service;
pub mod token_service;
pub mod wallet_service;

pub use automation_service::*;
pub use order_service::*;
pub use product_service::*;
pub use sync_service::*;
pub use token_service::*;
pub use wallet_service::*;
