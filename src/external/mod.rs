pub mod shopee;
pub mod signature;

pub use shopee::*;
