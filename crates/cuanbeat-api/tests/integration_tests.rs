//! # Integration Tests for cuanbeat-api
//!
//! Exercises the assembled application end to end over the in-memory
//! backend: registration with referrals, catalog management, the
//! submission review cascade, and error translation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cuanbeat_api::state::AppState;

/// Helper: build the test app over a fresh in-memory store.
fn test_app() -> axum::Router {
    cuanbeat_api::app(AppState::in_memory())
}

/// Helper: read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn alice_registration() -> Value {
    serde_json::json!({
        "tiktok_username": "@alice",
        "email": "alice@x.com",
        "phone": "081234567890",
        "ewallet_type": "dana",
        "ewallet_number": "0812345678901"
    })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Client Bootstrap ---------------------------------------------------------

#[tokio::test]
async fn test_config_endpoint_returns_public_values() {
    let app = test_app();
    let response = app.oneshot(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["storage_backend"], "memory");
    assert!(body["backend_url"].is_string());
}

// -- Registration -------------------------------------------------------------

#[tokio::test]
async fn test_registration_round_trip() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post("/api/creators", alice_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let alice = body_json(response).await;
    assert_eq!(alice["id"], 1);
    assert_eq!(alice["referral_code"], "ALICE-REF-1");
    assert_eq!(alice["total_earnings"], 0);
    assert_eq!(alice["video_count"], 0);

    let response = app.clone().oneshot(get("/api/creators")).await.unwrap();
    let creators = body_json(response).await;
    assert_eq!(creators.as_array().unwrap().len(), 1);

    let response = app.oneshot(get("/api/creators/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_registration_persists_nothing() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post(
            "/api/creators",
            serde_json::json!({
                "tiktok_username": "@alice",
                "email": "not-an-email",
                "phone": "081234567890",
                "ewallet_type": "dana",
                "ewallet_number": "0812345678901"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid data");
    assert_eq!(body["details"][0]["field"], "email");

    let response = app.oneshot(get("/api/creators")).await.unwrap();
    let creators = body_json(response).await;
    assert!(creators.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_a_client_error() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/creators")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- The Example Scenario -----------------------------------------------------
//
// Register @alice; register @bob referred by alice; alice's referral
// count becomes 1. Admin creates a song at rate 100; bob submits a
// video; the admin approves it; bob's totals move to 100 / 1.

#[tokio::test]
async fn test_full_promotion_flow() {
    let app = test_app();

    // Register @alice.
    let response = app
        .clone()
        .oneshot(post("/api/creators", alice_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let alice = body_json(response).await;
    assert_eq!(alice["referral_code"], "ALICE-REF-1");
    let alice_id = alice["id"].as_i64().unwrap();

    // Validate alice's code the way the registration form does.
    let response = app
        .clone()
        .oneshot(get("/api/referrals/validate/ALICE-REF-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let validation = body_json(response).await;
    assert_eq!(validation["valid"], true);
    assert_eq!(validation["referrer"]["id"], alice_id);

    // Register @bob with alice as referrer.
    let response = app
        .clone()
        .oneshot(post(
            "/api/creators",
            serde_json::json!({
                "tiktok_username": "@bob",
                "email": "bob@x.com",
                "phone": "081234567891",
                "ewallet_type": "ovo",
                "ewallet_number": "0812345678902",
                "referred_by": alice_id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bob = body_json(response).await;
    let bob_id = bob["id"].as_i64().unwrap();

    // One referral edge: alice → bob, pending, bonus 500.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/referrals/count/{alice_id}")))
        .await
        .unwrap();
    let count = body_json(response).await;
    assert_eq!(count["count"], 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/referrals/creator/{alice_id}")))
        .await
        .unwrap();
    let referrals = body_json(response).await;
    assert_eq!(referrals[0]["referrer_id"], alice_id);
    assert_eq!(referrals[0]["referred_id"], bob_id);
    assert_eq!(referrals[0]["bonus_amount"], 500);
    assert_eq!(referrals[0]["status"], "pending");

    // Admin creates the song.
    let response = app
        .clone()
        .oneshot(post(
            "/api/songs",
            serde_json::json!({
                "title": "Test Track",
                "artist": "Artist A",
                "status": "available",
                "earnings_per_video": 100,
                "duration": "3:45",
                "is_active": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let song = body_json(response).await;
    let song_id = song["id"].as_i64().unwrap();

    // Bob submits a video.
    let response = app
        .clone()
        .oneshot(post(
            "/api/submissions",
            serde_json::json!({
                "creator_id": bob_id,
                "song_id": song_id,
                "tiktok_url": "https://www.tiktok.com/@bob/video/123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission = body_json(response).await;
    assert_eq!(submission["status"], "pending");
    assert_eq!(submission["earnings"], 0);
    let submission_id = submission["id"].as_i64().unwrap();

    // Admin approves it.
    let response = app
        .clone()
        .oneshot(put(
            &format!("/api/submissions/{submission_id}"),
            serde_json::json!({"status": "approved"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["earnings"], 100);

    // Bob's totals moved exactly once.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/creators/{bob_id}")))
        .await
        .unwrap();
    let bob = body_json(response).await;
    assert_eq!(bob["total_earnings"], 100);
    assert_eq!(bob["video_count"], 1);

    // A second approval attempt is an invalid-state error.
    let response = app
        .clone()
        .oneshot(put(
            &format!("/api/submissions/{submission_id}"),
            serde_json::json!({"status": "rejected"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(get(&format!("/api/creators/{bob_id}")))
        .await
        .unwrap();
    let bob = body_json(response).await;
    assert_eq!(bob["total_earnings"], 100);
    assert_eq!(bob["video_count"], 1);
}

// -- Song Catalog -------------------------------------------------------------

#[tokio::test]
async fn test_active_song_listing_round_trip() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post(
            "/api/songs",
            serde_json::json!({
                "title": "Lagu Viral",
                "artist": "Artist B",
                "status": "trending",
                "duration": "2:58"
            }),
        ))
        .await
        .unwrap();
    let song = body_json(response).await;
    let song_id = song["id"].as_i64().unwrap();
    // Defaults applied: rate 100, active.
    assert_eq!(song["earnings_per_video"], 100);
    assert_eq!(song["is_active"], true);

    let response = app.clone().oneshot(get("/api/songs/active")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // Deactivate, then the active listing excludes it while the full
    // catalog keeps it.
    let response = app
        .clone()
        .oneshot(put(
            &format!("/api/songs/{song_id}"),
            serde_json::json!({"is_active": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/songs/active")).await.unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = app.oneshot(get("/api/songs")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

// -- Submissions --------------------------------------------------------------

#[tokio::test]
async fn test_rejection_leaves_totals_unchanged() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post("/api/creators", alice_registration()))
        .await
        .unwrap();
    let alice = body_json(response).await;
    let alice_id = alice["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post(
            "/api/songs",
            serde_json::json!({
                "title": "Test Track",
                "artist": "Artist A",
                "status": "available",
                "duration": "3:45"
            }),
        ))
        .await
        .unwrap();
    let song_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post(
            "/api/submissions",
            serde_json::json!({
                "creator_id": alice_id,
                "song_id": song_id,
                "tiktok_url": "https://www.tiktok.com/@alice/video/9"
            }),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(put(
            &format!("/api/submissions/{submission_id}"),
            serde_json::json!({"status": "rejected", "admin_notes": "song mismatch"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rejected = body_json(response).await;
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["earnings"], 0);
    assert_eq!(rejected["admin_notes"], "song mismatch");

    let response = app
        .oneshot(get(&format!("/api/creators/{alice_id}")))
        .await
        .unwrap();
    let alice = body_json(response).await;
    assert_eq!(alice["total_earnings"], 0);
    assert_eq!(alice["video_count"], 0);
}

#[tokio::test]
async fn test_update_unknown_submission_returns_404() {
    let app = test_app();
    let response = app
        .oneshot(put(
            "/api/submissions/99",
            serde_json::json!({"status": "approved"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Referrals ----------------------------------------------------------------

#[tokio::test]
async fn test_unknown_referral_code_is_invalid_without_side_effects() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/api/referrals/validate/GHOST-REF-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid referral code");

    // Registering with the same unknown code still succeeds and
    // records nothing.
    let mut registration = alice_registration();
    registration["referral_code"] = Value::String("GHOST-REF-7".to_string());
    let response = app
        .clone()
        .oneshot(post("/api/creators", registration))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let alice = body_json(response).await;
    assert!(alice["referred_by"].is_null());

    let response = app.oneshot(get("/api/referrals/count/1")).await.unwrap();
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_referral_count_tracks_sequence_of_registrations() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post("/api/creators", alice_registration()))
        .await
        .unwrap();
    let alice_id = body_json(response).await["id"].as_i64().unwrap();

    for n in 0..3 {
        let response = app
            .clone()
            .oneshot(post(
                "/api/creators",
                serde_json::json!({
                    "tiktok_username": format!("@friend{n}"),
                    "email": format!("friend{n}@x.com"),
                    "phone": "081234567890",
                    "ewallet_type": "gopay",
                    "ewallet_number": "0812345678901",
                    "referral_code": "ALICE-REF-1"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(get(&format!("/api/referrals/count/{alice_id}")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 3);
}
