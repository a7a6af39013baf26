pub mod auth;
pub mod dao;
pub mod export;

pub use auth::AuthService;
pub use dao::*;
