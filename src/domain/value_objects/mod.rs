pub mod access_token;
pub mod coordinates;
pub mod document_type;
pub mod stop_status;

pub use access_token::AccessToken;
pub use coordinates::Coordinates;
pub use document_type::{detect_document_type, DocumentType};
pub use stop_status::StopStatus;
