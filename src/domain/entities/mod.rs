pub mod erp;
pub mod fleet;
pub mod location;
pub mod offline;
pub mod pod;
pub mod route;
pub mod user;

pub use erp::{ErpDocument, ErpDocumentLine};
pub use fleet::{Driver, Order, Partner, Settings, Vehicle};
pub use location::LocationPing;
pub use offline::{QueueName, QueuedEntry, QueuedRecord};
pub use pod::{Attachment, ProofOfDelivery};
pub use route::{move_index, Route, Stop};
pub use user::{UserProfile, UserRole};
