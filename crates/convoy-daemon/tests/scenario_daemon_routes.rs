//! In-process scenario tests for the convoy-daemon HTTP surface.
//!
//! These tests spin up the Axum router **without** binding a TCP socket:
//! each one builds `routes::build_router` over a seeded in-memory fleet and
//! drives it via `tower::ServiceExt::oneshot`. They cover the route wiring
//! and the error envelope; the business rules themselves are tested at the
//! service layer.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

use convoy_daemon::{routes, state::AppState};
use convoy_testkit::FleetFixture;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_state() -> (FleetFixture, Arc<AppState>) {
    let fx = FleetFixture::seed().await.expect("seed fixture");
    let st = Arc::new(AppState::in_memory(Arc::clone(&fx.store), "cfg-test-hash"));
    (fx, st)
}

fn router(st: &Arc<AppState>) -> axum::Router {
    routes::build_router(Arc::clone(st))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_req(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Drive the router with one request and return (status, body bytes).
async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

/// The standard create body: the fixture's request plus the acting admin.
fn create_body(fx: &FleetFixture) -> serde_json::Value {
    let mut body = serde_json::to_value(fx.transport_request()).expect("serialize request");
    body["acting_user_id"] = serde_json::json!(fx.admin);
    body
}

/// POST the standard create body and return the new transport's JSON.
async fn create_transport(fx: &FleetFixture, st: &Arc<AppState>) -> serde_json::Value {
    let (status, body) = call(router(st), json_req("POST", "/api/transports", &create_body(fx))).await;
    assert_eq!(status, StatusCode::CREATED);
    parse_json(body)
}

// ---------------------------------------------------------------------------
// Meta routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok_with_service_name() {
    let (_fx, st) = make_state().await;

    let (status, body) = call(router(&st), get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "convoy-daemon");
}

#[tokio::test]
async fn status_reports_store_mode_and_config_hash() {
    let (_fx, st) = make_state().await;

    let (status, body) = call(router(&st), get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["store"], "memory");
    assert_eq!(json["config_hash"], "cfg-test-hash");
    assert!(json["db"].is_null(), "no db probe in memory mode");
    assert!(json["daemon_uptime_secs"].is_u64());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_fx, st) = make_state().await;

    let (status, _) = call(router(&st), get("/api/does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Transport CRUD over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_transport_roundtrip() {
    let (fx, st) = make_state().await;

    let created = create_transport(&fx, &st).await;
    assert_eq!(created["status"], "PLANNED");
    assert_eq!(created["vehicle_id"], serde_json::json!(fx.vehicle));
    assert_eq!(created["trailer_id"], serde_json::json!(fx.trailer));
    assert!(created["driver_id"].is_null());
    assert_eq!(created["planned_start_at"], "2025-07-01T06:00:00Z");
    assert!(created["actual_start_at"].is_null());

    let id = created["id"].as_str().expect("id is a string");
    let (status, body) = call(router(&st), get(&format!("/api/transports/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["id"].as_str(), Some(id));
}

#[tokio::test]
async fn rule_refusals_and_validation_use_distinct_envelopes() {
    let (fx, st) = make_state().await;

    // Planned end before planned start: a business rule, 409.
    let mut body = create_body(&fx);
    body["planned_start_at"] = serde_json::json!("2025-07-02T18:00:00Z");
    body["planned_end_at"] = serde_json::json!("2025-07-01T06:00:00Z");

    let (status, resp) = call(router(&st), json_req("POST", "/api/transports", &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let json = parse_json(resp);
    assert_eq!(json["error"], "BUSINESS_RULE");
    assert_eq!(json["message"], "Planned end must be after planned start");

    // Missing vehicle reference: malformed input, 400.
    let mut body = create_body(&fx);
    body.as_object_mut().unwrap().remove("vehicle_id");

    let (status, resp) = call(router(&st), json_req("POST", "/api/transports", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json = parse_json(resp);
    assert_eq!(json["error"], "VALIDATION");
    assert_eq!(json["message"], "vehicleId is required");
}

#[tokio::test]
async fn missing_transport_maps_to_404() {
    let (_fx, st) = make_state().await;

    let ghost = uuid::Uuid::new_v4();
    let (status, body) = call(router(&st), get(&format!("/api/transports/{ghost}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json = parse_json(body);
    assert_eq!(json["error"], "NOT_FOUND");
    assert_eq!(json["message"], format!("Transport not found: {ghost}"));
}

#[tokio::test]
async fn resource_conflicts_map_to_409() {
    let (fx, st) = make_state().await;
    let _first = create_transport(&fx, &st).await;

    // Same vehicle again while the first transport is still PLANNED.
    let (status, body) = call(
        router(&st),
        json_req("POST", "/api/transports", &create_body(&fx)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let json = parse_json(body);
    assert_eq!(json["error"], "BUSINESS_RULE");
    assert_eq!(
        json["message"],
        "Vehicle is already assigned to an active transport"
    );
}

// ---------------------------------------------------------------------------
// Assignment and status changes over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn driver_chain_and_history_via_routes() {
    let (fx, st) = make_state().await;
    let created = create_transport(&fx, &st).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Assign the driver.
    let assign = serde_json::json!({ "driver_id": fx.driver });
    let (status, body) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/assign-driver"), &assign),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["driver_id"], serde_json::json!(fx.driver));

    // The driver accepts.
    let accept = serde_json::json!({
        "status": "ACCEPTED",
        "actor": "DRIVER",
        "user_id": fx.driver
    });
    let (status, body) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/status"), &accept),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "ACCEPTED");

    // History reads newest first, with the acting driver recorded.
    let (status, body) = call(router(&st), get(&format!("/api/transports/{id}/history"))).await;
    assert_eq!(status, StatusCode::OK);
    let rows = parse_json(body);
    let rows = rows.as_array().expect("history is an array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["status"], "ACCEPTED");
    assert_eq!(rows[0]["changed_by"], serde_json::json!(fx.driver));
    assert_eq!(rows[1]["status"], "PLANNED");
}

#[tokio::test]
async fn admin_cannot_take_driver_only_steps_via_routes() {
    let (fx, st) = make_state().await;
    let created = create_transport(&fx, &st).await;
    let id = created["id"].as_str().unwrap();

    let body = serde_json::json!({
        "status": "ACCEPTED",
        "actor": "ADMIN",
        "user_id": fx.admin
    });
    let (status, resp) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/status"), &body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let json = parse_json(resp);
    assert_eq!(json["error"], "BUSINESS_RULE");
    assert_eq!(
        json["message"],
        "Admin cannot set intermediate driver-only status: ACCEPTED"
    );
}

// ---------------------------------------------------------------------------
// Cargo over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cargo_capacity_rules_apply_via_routes() {
    let (fx, st) = make_state().await;
    let created = create_transport(&fx, &st).await;
    let id = created["id"].as_str().unwrap().to_string();

    // 60 kg against a 50 kg trailer payload.
    let too_heavy = serde_json::json!({
        "description": "palletized goods",
        "weight_g": 60_000,
        "volume_l": 2_000
    });
    let (status, body) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/cargo"), &too_heavy),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        parse_json(body)["message"],
        "Cargo weight exceeds trailer payload (50 kg)"
    );

    // 10 kg fits.
    let fits = serde_json::json!({
        "description": "palletized goods",
        "weight_g": 10_000,
        "volume_l": 2_000
    });
    let (status, body) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/cargo"), &fits),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let cargo = parse_json(body);
    assert_eq!(cargo["transport_id"].as_str(), Some(id.as_str()));

    let (status, body) = call(router(&st), get(&format!("/api/transports/{id}/cargo"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body).as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Resource routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn availability_listings_reflect_claims() {
    let (fx, st) = make_state().await;

    let (_, body) = call(router(&st), get("/api/vehicles/available")).await;
    assert_eq!(parse_json(body).as_array().unwrap().len(), 2);
    let (_, body) = call(router(&st), get("/api/trailers/available")).await;
    assert_eq!(parse_json(body).as_array().unwrap().len(), 1);

    let _t = create_transport(&fx, &st).await;

    let (_, body) = call(router(&st), get("/api/vehicles/available")).await;
    let vehicles = parse_json(body);
    let vehicles = vehicles.as_array().unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["id"], serde_json::json!(fx.second_vehicle));

    let (_, body) = call(router(&st), get("/api/trailers/available")).await;
    assert!(parse_json(body).as_array().unwrap().is_empty());
}

#[tokio::test]
async fn vehicle_delete_guard_via_routes() {
    let (fx, st) = make_state().await;
    let _t = create_transport(&fx, &st).await;

    // The claimed vehicle is pinned by the referencing transport.
    let (status, body) = call(router(&st), delete(&format!("/api/vehicles/{}", fx.vehicle))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        parse_json(body)["message"],
        "Vehicle is assigned to a transport and cannot be deleted"
    );

    // The unreferenced one deletes, and is then gone.
    let uri = format!("/api/vehicles/{}", fx.second_vehicle);
    let (status, _) = call(router(&st), delete(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(router(&st), delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        parse_json(body)["message"],
        format!("Vehicle not found: {}", fx.second_vehicle)
    );
}

#[tokio::test]
async fn driver_status_guard_via_routes() {
    let (fx, st) = make_state().await;
    let created = create_transport(&fx, &st).await;
    let id = created["id"].as_str().unwrap();

    let assign = serde_json::json!({ "driver_id": fx.driver });
    let (status, _) = call(
        router(&st),
        json_req("POST", &format!("/api/transports/{id}/assign-driver"), &assign),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Stepping away is allowed while named on a live transport.
    let unavailable = serde_json::json!({ "status": "UNAVAILABLE" });
    let (status, _) = call(
        router(&st),
        json_req("POST", &format!("/api/drivers/{}/status", fx.driver), &unavailable),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Returning to AVAILABLE is not.
    let available = serde_json::json!({ "status": "AVAILABLE" });
    let (status, body) = call(
        router(&st),
        json_req("POST", &format!("/api/drivers/{}/status", fx.driver), &available),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        parse_json(body)["message"],
        "Driver is assigned to active transport"
    );
}
