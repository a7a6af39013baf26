pub mod dispatcher;
pub mod gateway;
pub mod handler;
pub mod storage;
