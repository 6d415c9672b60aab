pub mod auth_service;
pub mod erp_service;
pub mod fleet_service;
pub mod navigation_service;
pub mod offline_queue;
pub mod pod_service;
pub mod preference_service;
pub mod route_service;
pub mod tracking_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::AuthService;
pub use erp_service::ErpService;
pub use fleet_service::FleetService;
pub use navigation_service::{NavigationLinks, NavigationService};
pub use offline_queue::{LocationQueue, OfflineQueue, PodQueue};
pub use pod_service::{PodService, SubmitOutcome};
pub use preference_service::PreferenceStore;
pub use route_service::{RouteSnapshot, RouteStore};
pub use tracking_service::{PingOutcome, TrackingService};
