pub mod gateway;
pub mod hook;

pub use gateway::{ClientError, GatewayClient, GatewayResponse};
pub use hook::EntityHook;
