mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde::Deserialize;
use tower::ServiceExt;

use common::{test_app, EMAIL, TOKEN};
use kenalan_swipe::repositories::session::SessionStore;
use kenalan_swipe::router;

#[derive(Deserialize)]
struct ProfileBody {
    code: String,
    id: i64,
    full_name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
}

fn post(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

const SKIP: &str = r#"{"swipe_left": true, "swipe_right": false}"#;

#[tokio::test]
async fn health_reports_up() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Server Up");
}

#[tokio::test]
async fn skip_returns_next_profile() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ProfileBody = sonic_rs::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.code, "0000");
    assert_eq!(body.id, 1);
    assert_eq!(body.full_name, "Candidate 1");

    let session = app.store.get(EMAIL).await.unwrap().unwrap();
    assert_eq!(session.swipe_count, 1);
    assert_eq!(session.viewed_profile_ids, vec![1]);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post("/v1/kenalan/view_profile", None, SKIP))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.get(EMAIL).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post("/v1/kenalan/view_profile", Some("stolen"), SKIP))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn both_flags_is_bad_request() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post(
            "/v1/kenalan/view_profile",
            Some(TOKEN),
            r#"{"swipe_left": true, "swipe_right": true, "current_viewed_profile_id": 1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = sonic_rs::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.code, "4002");
}

#[tokio::test]
async fn exhausted_pool_is_not_found() {
    let app = test_app(1);
    let router = router::app(app.state);

    let first = router
        .clone()
        .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.get(EMAIL).await.unwrap().unwrap().swipe_count, 1);
}

#[tokio::test]
async fn quota_then_purchase_unlocks_swipes() {
    let app = test_app(20);
    let router = router::app(app.state);

    for _ in 0..10 {
        let response = router
            .clone()
            .oneshot(post(
                "/v1/kenalan/view_profile",
                Some(TOKEN),
                r#"{"swipe_right": true, "current_viewed_profile_id": 5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let blocked = router
        .clone()
        .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let purchase = router
        .clone()
        .oneshot(post(
            "/v1/kenalan/purchase",
            Some(TOKEN),
            r#"{"product_code": "UNLIMITED_SWIPE", "product_name": "Unlimited Swipe", "expired_at": "2030-01-01T00:00:00"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(purchase.status(), StatusCode::OK);

    let unlocked = router
        .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
        .await
        .unwrap();
    assert_eq!(unlocked.status(), StatusCode::OK);
    assert_eq!(app.store.get(EMAIL).await.unwrap().unwrap().swipe_count, 11);
}

#[tokio::test]
async fn purchase_rejects_unknown_product() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post(
            "/v1/kenalan/purchase",
            Some(TOKEN),
            r#"{"product_code": "SUPER_LIKE", "product_name": "Super Like", "expired_at": "2030-01-01T00:00:00"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purchase_rejects_bad_expiry() {
    let app = test_app(3);
    let response = router::app(app.state)
        .oneshot(post(
            "/v1/kenalan/purchase",
            Some(TOKEN),
            r#"{"product_code": "UNLIMITED_SWIPE", "product_name": "Unlimited Swipe", "expired_at": "tomorrow"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = sonic_rs::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.code, "4000");
}

#[tokio::test]
async fn concurrent_skips_are_not_lost() {
    let app = test_app(10);
    let router = router::app(app.state);

    let requests = (0..4).map(|_| {
        router
            .clone()
            .oneshot(post("/v1/kenalan/view_profile", Some(TOKEN), SKIP))
    });
    let responses = futures::future::join_all(requests).await;

    let mut ids = Vec::new();
    for response in responses {
        let response = response.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: ProfileBody = sonic_rs::from_slice(&body_bytes(response).await).unwrap();
        ids.push(body.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let session = app.store.get(EMAIL).await.unwrap().unwrap();
    assert_eq!(session.swipe_count, 4);
    assert_eq!(session.viewed_profile_ids.len(), 4);
}
