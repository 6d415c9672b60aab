pub mod database;
pub mod http;
pub mod platform;
pub mod storage;
