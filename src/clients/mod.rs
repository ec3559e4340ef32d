//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod order_client;
pub mod return_client;
pub mod wallet_client;

pub use order_client::*;
pub use return_client::*;
pub use wallet_client::*;
