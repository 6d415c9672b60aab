mod common;

use common::{
    build_app, join_with_timeout, login_body, next_request, routes_body,
    spawn_json_sequence_server, MockHttpResponse,
};
use delivery_lib::domain::value_objects::StopStatus;
use serde_json::json;
use std::time::Duration as StdDuration;

#[tokio::test]
async fn stop_status_update_is_mirrored_in_list_detail_and_cache() {
    let route_detail = json!({"data": routes_body()[0].clone()});
    let (base_url, rx, handle) = spawn_json_sequence_server(vec![
        MockHttpResponse::json(200, login_body("tok-flow")),
        MockHttpResponse::json(200, routes_body()),
        MockHttpResponse::json(200, route_detail),
        MockHttpResponse::json(200, json!({"ok": true})),
    ]);
    let app = build_app(&base_url).await;
    let state = &app.state;

    state
        .auth
        .login("driver@example.com", "secret-pass")
        .await
        .expect("login");
    state.routes.fetch_routes().await.expect("routes");
    state.routes.select_route("r1").await.expect("detail");
    state
        .routes
        .update_stop_status("s2", StopStatus::Delivered)
        .await
        .expect("status");

    let snapshot = state.routes.snapshot().await;
    let listed = snapshot.routes[0].find_stop("s2").unwrap();
    let detailed = snapshot.selected.as_ref().unwrap().find_stop("s2").unwrap();
    assert_eq!(listed.status, StopStatus::Delivered);
    assert_eq!(detailed.status, StopStatus::Delivered);
    assert_eq!(
        snapshot.routes[0].find_stop("s1").unwrap().status,
        StopStatus::Pending
    );
    // server-only fields survive the patch
    assert_eq!(snapshot.routes[0].extra.get("depot"), Some(&json!("Main")));
    assert_eq!(
        snapshot.routes[0].find_stop("s1").unwrap().extra.get("eta"),
        Some(&json!("09:00"))
    );

    let cached = state.routes.load_cached_routes().await.expect("cache");
    assert_eq!(
        cached[0].find_stop("s2").unwrap().status,
        StopStatus::Delivered
    );

    for _ in 0..3 {
        next_request(&rx);
    }
    let put = next_request(&rx);
    assert_eq!(put.path, "/stops/s2/status");
    assert_eq!(put.json(), json!({"status": "delivered"}));
    join_with_timeout(handle, StdDuration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn preference_writes_are_debounced_against_the_backend() {
    let (base_url, rx, handle) = spawn_json_sequence_server(vec![
        MockHttpResponse::json(200, json!({"value": 15})),
        MockHttpResponse::json(200, json!({"value": "dark"})),
    ]);
    let app = build_app(&base_url).await;
    let prefs = &app.state.preferences;

    prefs.set("map_zoom", json!(13)).await.unwrap();
    prefs.set("map_zoom", json!(14)).await.unwrap();
    prefs.set("map_zoom", json!(15)).await.unwrap();
    assert_eq!(prefs.get("map_zoom").await.unwrap(), Some(json!(15)));

    tokio::time::sleep(StdDuration::from_millis(300)).await;
    let write = next_request(&rx);
    assert_eq!(write.method, "PUT");
    assert_eq!(write.path, "/preferences/map_zoom");
    assert_eq!(write.json(), json!({"value": 15}));

    prefs.set("theme", json!("dark")).await.unwrap();
    app.state.shutdown().await;
    let flushed = next_request(&rx);
    assert_eq!(flushed.path, "/preferences/theme");
    assert_eq!(flushed.json(), json!({"value": "dark"}));

    join_with_timeout(handle, StdDuration::from_secs(5));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn navigation_opens_native_link_for_selected_stop() {
    let (base_url, _rx, handle) = spawn_json_sequence_server(vec![MockHttpResponse::json(
        200,
        routes_body()[0].clone(),
    )]);
    let app = build_app(&base_url).await;

    let route = app.state.routes.select_route("r1").await.expect("route");
    let stop = route.find_stop("s1").unwrap();
    let opened = app.state.navigation.open(stop).await.expect("open");
    assert_eq!(opened, "google.navigation:q=45.81,15.97");
    assert_eq!(*app.opener.opened.lock().unwrap(), vec![opened]);
    join_with_timeout(handle, StdDuration::from_secs(5));
}

#[tokio::test]
async fn restore_session_with_rejected_token_signs_out() {
    let (base_url, rx, handle) = spawn_json_sequence_server(vec![
        MockHttpResponse::json(200, login_body("tok-old")),
        MockHttpResponse::json(401, json!({"detail": "expired"})),
    ]);
    let app = build_app(&base_url).await;
    app.state
        .auth
        .login("driver@example.com", "secret-pass")
        .await
        .expect("login");

    let restored = app.state.auth.restore_session().await.expect("restore");
    assert!(restored.is_none());
    assert!(!app.state.auth.is_authenticated().await.unwrap());

    next_request(&rx);
    assert_eq!(next_request(&rx).path, "/auth/me");
    join_with_timeout(handle, StdDuration::from_secs(5));
}
