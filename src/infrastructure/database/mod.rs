pub mod connection_pool;
pub mod kv_store;
pub mod offline_store;

pub use connection_pool::ConnectionPool;
pub use kv_store::SqliteKeyValueStore;
pub use offline_store::SqliteOfflineStore;
