pub mod secure_storage;
pub mod token_store;

pub use secure_storage::{FileSecureStorage, KeyringSecureStorage, SecureStorage};
pub use token_store::TokenStore;
