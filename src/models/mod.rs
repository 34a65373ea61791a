pub mod automation;
pub mod order;
pub mod pagination;
pub mod product;
pub mod token;
pub mod wallet;

pub use automation::*;
pub use order::*;
pub use pagination::*;
pub use product::*;
pub use token::*;
pub use wallet::*;
