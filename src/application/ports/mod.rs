pub mod credential_store;
pub mod delivery_api;
pub mod key_value_store;
pub mod offline_store;
pub mod url_opener;

pub use credential_store::CredentialStore;
pub use delivery_api::{DeliveryApi, LoginSession, PreferenceRemote};
pub use key_value_store::KeyValueStore;
pub use offline_store::OfflinePersistence;
pub use url_opener::UrlOpener;
