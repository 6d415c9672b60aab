pub mod config;
pub mod error;
pub mod in_flight;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind, Result};
pub use in_flight::{InFlightGuard, InFlightTracker};
