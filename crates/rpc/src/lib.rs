pub mod common;
pub mod error;
pub mod mech;
pub mod proxy;

pub use error::*;
pub use jsonrpsee::core::RpcResult;
