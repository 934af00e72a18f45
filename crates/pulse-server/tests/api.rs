//! End-to-end API tests: the real router, an in-memory store, and the
//! client-side signing scheme.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use pulse_server::{build_router, now_secs, AppState, ServerConfig};

fn test_app() -> Router {
    let conn = pulse_db::open_memory().expect("open in-memory db");
    let config = ServerConfig::default();
    build_router(AppState::new(conn, &config))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

async fn register(app: &Router) -> (String, String) {
    let req = Request::builder()
        .method("POST")
        .uri("/device/register")
        .body(Body::empty())
        .expect("request");
    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    (
        json["deviceId"].as_str().expect("deviceId").to_string(),
        json["secret"].as_str().expect("secret").to_string(),
    )
}

fn signed_post(path: &str, device_id: &str, secret: &str, ts: u64, body: &str) -> Request<Body> {
    let sig = pulse_auth::compute_signature(device_id, ts, body, secret);
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-device-id", device_id)
        .header("x-timestamp", ts.to_string())
        .header("x-signature", sig)
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn signed_get(path: &str, device_id: &str, secret: &str, ts: u64) -> Request<Body> {
    // GET requests sign the empty body.
    let sig = pulse_auth::compute_signature(device_id, ts, "", secret);
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-device-id", device_id)
        .header("x-timestamp", ts.to_string())
        .header("x-signature", sig)
        .body(Body::empty())
        .expect("request")
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("request")
}

async fn ingest(app: &Router, device_id: &str, secret: &str, cell_id: &str) -> (StatusCode, Value) {
    let now = now_secs();
    let body = format!(r#"{{"cellId":"{cell_id}"}}"#);
    send(app, signed_post("/ingest", device_id, secret, now, &body)).await
}

#[tokio::test]
async fn health_reports_service_name() {
    let app = test_app();
    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "buzzpulse");
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let app = test_app();
    let (status, json) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["ok"], false);
}

#[tokio::test]
async fn register_returns_fresh_credentials() {
    let app = test_app();
    let (id_a, secret_a) = register(&app).await;
    let (id_b, secret_b) = register(&app).await;
    assert_ne!(id_a, id_b);
    assert_ne!(secret_a, secret_b);
    assert_eq!(id_a.len(), 36);
}

#[tokio::test]
async fn ingest_building_then_stats_and_heat() {
    let app = test_app();
    let (device, secret) = register(&app).await;

    let (status, json) = ingest(&app, &device, &secret, "b:eng-quad").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["cellId"], "b:eng-quad");
    assert!((json["score"].as_f64().expect("score") - 1.0).abs() < 1e-9);
    assert_eq!(json["presence"], 1);

    let (status, json) = send(&app, get("/stats?cellId=b:eng-quad")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currentPresence"], 1);
    assert_eq!(json["lastHourHits"], 1);
    assert!(json["score"].as_f64().expect("score") > 0.0);
    assert!(json.get("myVibe").is_none());

    // Second device raises presence and score.
    let (device2, secret2) = register(&app).await;
    let (status, _) = ingest(&app, &device2, &secret2, "b:eng-quad").await;
    assert_eq!(status, StatusCode::OK);

    let bbox = "-122.18,37.42,-122.16,37.44";
    let (status, json) = send(&app, get(&format!("/heat?bbox={bbox}&min=1&window=30"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["count"], 1);
    let point = &json["data"][0];
    assert!((point["lat"].as_f64().expect("lat") - 37.42805).abs() < 1e-6);
    assert!((point["lng"].as_f64().expect("lng") - -122.1723).abs() < 1e-6);
    assert_eq!(point["radius"], 25.0);
    assert!(point["score"].as_f64().expect("score") > 1.0);
    // Cell ids are hidden unless debug=1.
    assert!(point.get("cellId").is_none());

    let (_, json) = send(&app, get(&format!("/heat?bbox={bbox}&debug=1"))).await;
    assert_eq!(json["data"][0]["cellId"], "b:eng-quad");
}

#[tokio::test]
async fn ingest_geohash_resolves_to_cell_midpoint() {
    let app = test_app();
    let (device, secret) = register(&app).await;

    // Precision-7 hash around the engineering quad.
    let hash = pulse_geo::encode(37.42805, -122.1723, 7);
    let (status, json) = ingest(&app, &device, &secret, &hash).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cellId"], Value::String(hash.clone()));

    let (status, json) = send(
        &app,
        get("/heat?bbox=-122.2,37.4,-122.1,37.5&min=1&window=30"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    let point = &json["data"][0];
    // Precision 7 cells report a 76.5 m radius.
    assert_eq!(point["radius"], 76.5);
    let mid = pulse_geo::decode(&hash).expect("decode");
    assert!((point["lat"].as_f64().expect("lat") - mid.lat).abs() < 1e-9);
    assert!((point["lng"].as_f64().expect("lng") - mid.lng).abs() < 1e-9);
}

#[tokio::test]
async fn ingest_rejects_invalid_cell_ids() {
    let app = test_app();
    let (device, secret) = register(&app).await;

    for bad in ["??", "9q9h", "b:", "b:Eng Quad"] {
        let (status, json) = ingest(&app, &device, &secret, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "cellId {bad:?}");
        assert_eq!(json["ok"], false);
    }

    // Malformed JSON body: signed correctly, still a 400 on validation.
    let now = now_secs();
    let (status, _) = send(
        &app,
        signed_post("/ingest", &device, &secret, now, "not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_rejects_tampering_and_replay() {
    let app = test_app();
    let (device, secret) = register(&app).await;
    let now = now_secs();

    // Signature over a different body than the one sent.
    let sig = pulse_auth::compute_signature(&device, now, r#"{"cellId":"b:main-quad"}"#, &secret);
    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("x-device-id", &device)
        .header("x-timestamp", now.to_string())
        .header("x-signature", sig)
        .body(Body::from(r#"{"cellId":"b:eng-quad"}"#))
        .expect("request");
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["ok"], false);

    // Correct signature, stale timestamp.
    let stale = now - 301;
    let body = r#"{"cellId":"b:eng-quad"}"#;
    let (status, _) = send(&app, signed_post("/ingest", &device, &secret, stale, body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown device.
    let (status, _) = send(
        &app,
        signed_post("/ingest", "ghost-device", &secret, now, body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Missing headers entirely.
    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .body(Body::from(body))
        .expect("request");
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing got through to the store.
    let (_, json) = send(&app, get("/stats?cellId=b:eng-quad")).await;
    assert_eq!(json["lastHourHits"], 0);
}

#[tokio::test]
async fn heat_validates_bbox_and_gates_small_cells() {
    let app = test_app();

    let (status, _) = send(&app, get("/heat")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, get("/heat?bbox=1,2,3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, get("/heat?bbox=a,b,c,d")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // One lone hit: visible at min=1, gated at min=2 regardless of score.
    let (device, secret) = register(&app).await;
    ingest(&app, &device, &secret, "b:eng-quad").await;

    let bbox = "-122.18,37.42,-122.16,37.44";
    let (_, json) = send(&app, get(&format!("/heat?bbox={bbox}&min=1"))).await;
    assert_eq!(json["count"], 1);
    let (_, json) = send(&app, get(&format!("/heat?bbox={bbox}&min=2"))).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["data"], Value::Array(vec![]));

    // Box elsewhere on the map misses the point.
    let (_, json) = send(&app, get("/heat?bbox=0,0,1,1&min=1")).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn vibe_requires_presence_in_a_building() {
    let app = test_app();
    let (device, secret) = register(&app).await;
    let now = now_secs();

    // No presence yet.
    let body = r#"{"cellId":"b:eng-quad","vibe":"busy"}"#;
    let (status, _) = send(&app, signed_post("/vibe", &device, &secret, now, body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Present in a geohash cell: reactions stay building-only.
    ingest(&app, &device, &secret, "9q9hvu7").await;
    let (status, _) = send(&app, signed_post("/vibe", &device, &secret, now, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Present in a building.
    ingest(&app, &device, &secret, "b:eng-quad").await;
    let (status, json) = send(&app, signed_post("/vibe", &device, &secret, now, body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cellId"], "b:eng-quad");
    assert_eq!(json["vibe"], "busy");

    // Unknown vibe values are rejected.
    let bad = r#"{"vibe":"meh"}"#;
    let (status, _) = send(&app, signed_post("/vibe", &device, &secret, now, bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vibe_overwrites_within_the_hour() {
    let app = test_app();
    let (device, secret) = register(&app).await;
    ingest(&app, &device, &secret, "b:main-quad").await;

    let now = now_secs();
    for vibe in ["busy", "chill"] {
        let body = format!(r#"{{"vibe":"{vibe}"}}"#);
        let (status, _) = send(&app, signed_post("/vibe", &device, &secret, now, &body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    // The signed stats view shows one slot holding the second value.
    let (status, json) = send(
        &app,
        signed_get("/stats?cellId=b:main-quad", &device, &secret, now),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["myVibe"], "chill");
    let vibes = json["vibes"].as_array().expect("vibes");
    assert_eq!(vibes.len(), 1);
    assert_eq!(vibes[0]["vibe"], "chill");
    assert_eq!(vibes[0]["count"], 1);
}

#[tokio::test]
async fn stats_for_unknown_cell_is_zeroed() {
    let app = test_app();
    let (status, json) = send(&app, get("/stats?cellId=b:empty-lot")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["score"], 0.0);
    assert_eq!(json["currentPresence"], 0);
    assert_eq!(json["lastHourHits"], 0);
    assert_eq!(json["typicalHits"], 0.0);

    let (status, _) = send(&app, get("/stats?cellId=??")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/stats")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_stats_signature_degrades_to_anonymous() {
    let app = test_app();
    let (device, secret) = register(&app).await;
    ingest(&app, &device, &secret, "b:eng-quad").await;

    let now = now_secs();
    let body = r#"{"vibe":"study"}"#;
    let (status, _) = send(&app, signed_post("/vibe", &device, &secret, now, body)).await;
    assert_eq!(status, StatusCode::OK);

    // Wrong secret: stats still answers, just without myVibe.
    let (status, json) = send(
        &app,
        signed_get("/stats?cellId=b:eng-quad", &device, "bogus-secret", now),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert!(json.get("myVibe").is_none());

    // Correct secret attaches it.
    let (_, json) = send(
        &app,
        signed_get("/stats?cellId=b:eng-quad", &device, &secret, now),
    )
    .await;
    assert_eq!(json["myVibe"], "study");
}
