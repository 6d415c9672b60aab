use crate::application::ports::{DeliveryApi, KeyValueStore};
use crate::domain::entities::{move_index, Route};
use crate::domain::value_objects::StopStatus;
use crate::shared::error::AppError;
use crate::shared::InFlightTracker;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const ROUTES_CACHE_KEY: &str = "cache:routes";

/// Route list plus the route currently open in the detail view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSnapshot {
    pub routes: Vec<Route>,
    pub selected: Option<Route>,
}

impl RouteSnapshot {
    fn find_route(&self, route_id: &str) -> Option<&Route> {
        self.selected
            .as_ref()
            .filter(|route| route.id == route_id)
            .or_else(|| self.routes.iter().find(|route| route.id == route_id))
    }

    /// Patches every cached copy of the stop. Returns how many views changed.
    fn apply_stop_status(&mut self, stop_id: &str, status: StopStatus) -> usize {
        let mut patched = 0;
        for route in self.routes.iter_mut().chain(self.selected.iter_mut()) {
            if route.apply_stop_status(stop_id, status) {
                patched += 1;
            }
        }
        patched
    }

    fn apply_sequence(&mut self, route_id: &str, ordered_ids: &[String]) -> Result<(), String> {
        for route in self
            .routes
            .iter_mut()
            .chain(self.selected.iter_mut())
            .filter(|route| route.id == route_id)
        {
            route.resequence(ordered_ids)?;
        }
        Ok(())
    }
}

/// Server-derived route state with optimistic local patches.
pub struct RouteStore {
    api: Arc<dyn DeliveryApi>,
    local: Arc<dyn KeyValueStore>,
    state: RwLock<RouteSnapshot>,
    in_flight: InFlightTracker,
}

impl RouteStore {
    pub fn new(api: Arc<dyn DeliveryApi>, local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            local,
            state: RwLock::new(RouteSnapshot::default()),
            in_flight: InFlightTracker::new(),
        }
    }

    pub async fn snapshot(&self) -> RouteSnapshot {
        self.state.read().await.clone()
    }

    pub async fn routes(&self) -> Vec<Route> {
        self.state.read().await.routes.clone()
    }

    pub async fn selected(&self) -> Option<Route> {
        self.state.read().await.selected.clone()
    }

    /// Replaces the cached list with the server's.
    pub async fn fetch_routes(&self) -> Result<Vec<Route>, AppError> {
        let routes = self.api.list_routes().await?;
        info!("Fetched {} routes", routes.len());
        {
            let mut state = self.state.write().await;
            state.routes = routes.clone();
        }
        self.persist(&routes).await;
        Ok(routes)
    }

    /// Restores the list persisted by the last successful fetch.
    pub async fn load_cached_routes(&self) -> Result<Vec<Route>, AppError> {
        let Some(raw) = self.local.get(ROUTES_CACHE_KEY).await? else {
            return Ok(Vec::new());
        };
        let routes: Vec<Route> = serde_json::from_str(&raw)
            .map_err(|e| AppError::DeserializationError(format!("cached routes: {e}")))?;
        self.state.write().await.routes = routes.clone();
        debug!("Restored {} cached routes", routes.len());
        Ok(routes)
    }

    pub async fn select_route(&self, route_id: &str) -> Result<Route, AppError> {
        let route = self.api.get_route(route_id).await?;
        self.state.write().await.selected = Some(route.clone());
        Ok(route)
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selected = None;
    }

    /// Pushes a stop status change, then patches the list and detail views
    /// together once the server accepted it. Any status may be requested,
    /// including leaving a terminal one; the backend decides.
    pub async fn update_stop_status(
        &self,
        stop_id: &str,
        status: StopStatus,
    ) -> Result<usize, AppError> {
        let _guard = self.in_flight.begin(
            &format!("stop:{stop_id}"),
            "A status update for this stop is already in progress",
        )?;
        self.api.update_stop_status(stop_id, status).await?;

        let (patched, routes) = {
            let mut state = self.state.write().await;
            let patched = state.apply_stop_status(stop_id, status);
            (patched, state.routes.clone())
        };
        debug!("Stop {stop_id} -> {status} patched in {patched} views");
        if patched > 0 {
            self.persist(&routes).await;
        }
        Ok(patched)
    }

    /// Re-sequences a route to `ordered_ids` (drag-and-drop result).
    pub async fn reorder_stops(&self, route_id: &str, ordered_ids: Vec<String>) -> Result<(), AppError> {
        {
            let state = self.state.read().await;
            let mut preview = state
                .find_route(route_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Route {route_id} is not loaded")))?;
            preview.resequence(&ordered_ids).map_err(AppError::ValidationError)?;
        }

        let _guard = self.in_flight.begin(
            &format!("route:{route_id}"),
            "This route is already being re-sequenced",
        )?;
        self.api.reorder_stops(route_id, &ordered_ids).await?;

        let routes = {
            let mut state = self.state.write().await;
            state
                .apply_sequence(route_id, &ordered_ids)
                .map_err(AppError::ValidationError)?;
            state.routes.clone()
        };
        self.persist(&routes).await;
        Ok(())
    }

    /// Moves the stop at position `from` to position `to`.
    pub async fn move_stop(&self, route_id: &str, from: usize, to: usize) -> Result<Vec<String>, AppError> {
        let current = {
            let state = self.state.read().await;
            state
                .find_route(route_id)
                .map(Route::stop_ids)
                .ok_or_else(|| AppError::NotFound(format!("Route {route_id} is not loaded")))?
        };
        let reordered = move_index(&current, from, to).map_err(AppError::ValidationError)?;
        if reordered == current {
            return Ok(reordered);
        }
        self.reorder_stops(route_id, reordered.clone()).await?;
        Ok(reordered)
    }

    /// Drops all cached route data (logout).
    pub async fn clear(&self) -> Result<(), AppError> {
        *self.state.write().await = RouteSnapshot::default();
        self.local.delete(ROUTES_CACHE_KEY).await
    }

    async fn persist(&self, routes: &[Route]) {
        let raw = match serde_json::to_string(routes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize routes for cache: {e}");
                return;
            }
        };
        if let Err(e) = self.local.set(ROUTES_CACHE_KEY, &raw).await {
            warn!("Failed to persist routes cache: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{MemoryKeyValueStore, MockDeliveryApi};
    use crate::domain::entities::route::fixtures::{route, stop};
    use tokio::sync::Notify;

    fn sample_routes() -> Vec<Route> {
        vec![
            route(
                "r1",
                vec![
                    stop("a", 1, StopStatus::Pending),
                    stop("b", 2, StopStatus::Pending),
                    stop("c", 3, StopStatus::Pending),
                ],
            ),
            route("r2", vec![stop("d", 1, StopStatus::Pending)]),
        ]
    }

    fn store_with(api: MockDeliveryApi) -> (RouteStore, Arc<MockDeliveryApi>, Arc<MemoryKeyValueStore>) {
        let api = Arc::new(api);
        let local = Arc::new(MemoryKeyValueStore::default());
        (RouteStore::new(api.clone(), local.clone()), api, local)
    }

    #[tokio::test]
    async fn status_update_patches_list_and_detail_together() {
        let (store, _api, _) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        store.select_route("r1").await.unwrap();

        let patched = store
            .update_stop_status("b", StopStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(patched, 2);

        let snapshot = store.snapshot().await;
        let in_list = snapshot.routes[0].find_stop("b").unwrap().status;
        let in_detail = snapshot.selected.as_ref().unwrap().find_stop("b").unwrap().status;
        assert_eq!(in_list, StopStatus::Delivered);
        assert_eq!(in_detail, StopStatus::Delivered);

        // everything else untouched
        for id in ["a", "c"] {
            assert_eq!(snapshot.routes[0].find_stop(id).unwrap().status, StopStatus::Pending);
            assert_eq!(
                snapshot.selected.as_ref().unwrap().find_stop(id).unwrap().status,
                StopStatus::Pending
            );
        }
        assert_eq!(snapshot.routes[1].find_stop("d").unwrap().status, StopStatus::Pending);
    }

    #[tokio::test]
    async fn repeated_update_is_idempotent() {
        let (store, _api, _) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        store.update_stop_status("a", StopStatus::Arrived).await.unwrap();
        let first = store.snapshot().await;
        store.update_stop_status("a", StopStatus::Arrived).await.unwrap();
        assert_eq!(store.snapshot().await, first);
    }

    #[tokio::test]
    async fn failed_call_leaves_cache_untouched() {
        let (store, api, _) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        let before = store.snapshot().await;

        api.fail_next_with(AppError::Network("offline".to_string()));
        assert!(store.update_stop_status("a", StopStatus::Arrived).await.is_err());
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn terminal_stop_can_be_corrected_to_another_status() {
        let mut routes = sample_routes();
        routes[0].stops[0].status = StopStatus::Delivered;
        let (store, api, _) = store_with(MockDeliveryApi::with_routes(routes));
        store.fetch_routes().await.unwrap();

        let patched = store
            .update_stop_status("a", StopStatus::Failed)
            .await
            .unwrap();
        assert_eq!(patched, 1);
        assert!(api.calls().contains(&"stop_status a failed".to_string()));
        assert_eq!(
            store.snapshot().await.routes[0].find_stop("a").unwrap().status,
            StopStatus::Failed
        );
    }

    #[tokio::test]
    async fn concurrent_update_for_same_stop_is_rejected() {
        let gate = Arc::new(Notify::new());
        let mut api = MockDeliveryApi::with_routes(sample_routes());
        api.gate = Some(gate.clone());
        let (store, api, _) = store_with(api);
        let store = Arc::new(store);
        store.fetch_routes().await.unwrap();

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.update_stop_status("a", StopStatus::Arrived).await })
        };
        while !store.in_flight.is_in_flight("stop:a") {
            tokio::task::yield_now().await;
        }

        let second = store.update_stop_status("a", StopStatus::Arrived).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        gate.notify_one();
        first.await.unwrap().unwrap();
        let calls = api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("stop_status"))
            .count();
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn fetched_routes_survive_restart_through_local_cache() {
        let (store, _api, local) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();

        let restarted = RouteStore::new(Arc::new(MockDeliveryApi::default()), local);
        let cached = restarted.load_cached_routes().await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(restarted.routes().await, cached);
    }

    #[tokio::test]
    async fn move_stop_pushes_new_sequence() {
        let (store, api, _) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        store.select_route("r1").await.unwrap();

        let order = store.move_stop("r1", 2, 0).await.unwrap();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert!(api.calls().contains(&"reorder r1 c,a,b".to_string()));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.routes[0].stop_ids(), order);
        assert_eq!(snapshot.selected.unwrap().stop_ids(), order);
    }

    #[tokio::test]
    async fn reorder_with_unknown_stop_is_rejected_locally() {
        let (store, api, _) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        let err = store
            .reorder_stops("r1", vec!["a".into(), "b".into(), "zzz".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(!api.calls().iter().any(|c| c.starts_with("reorder")));
    }

    #[tokio::test]
    async fn clear_drops_memory_and_local_cache() {
        let (store, _api, local) = store_with(MockDeliveryApi::with_routes(sample_routes()));
        store.fetch_routes().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.routes().await.is_empty());
        assert!(local.get(ROUTES_CACHE_KEY).await.unwrap().is_none());
    }
}
