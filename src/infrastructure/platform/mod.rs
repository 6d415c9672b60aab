pub mod url_opener;

pub use url_opener::SystemUrlOpener;
