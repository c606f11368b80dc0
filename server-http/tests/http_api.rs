use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use banner::auth::{ensure_admin, TokenIssuer};
use banner::clock::ManualClock;
use banner::planes::control::CacheWritePolicy;
use banner::ports::CatalogStore;
use serde_json::{json, Value};
use server_http::{build_router, AppState};
use std::sync::Arc;
use storage_engine::{LockedBannerCache, MemoryBannerStore, MemoryUserRepository, DEFAULT_CACHE_TTL};
use tower::ServiceExt;

const ADMIN: &str = "admin";
const ADMIN_PASSWORD: &str = "admin1234";

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(MemoryBannerStore::new());
        store.create_feature("checkout").await.unwrap();
        store.create_tag("new-users").await.unwrap();
        store.create_tag("returning").await.unwrap();

        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(LockedBannerCache::new(DEFAULT_CACHE_TTL, clock.clone()));
        let state = AppState::from_components(
            store,
            Arc::new(MemoryUserRepository::new()),
            cache,
            TokenIssuer::new("test-secret", 600),
            CacheWritePolicy::Untouched,
        );
        ensure_admin(&state.auth, ADMIN, ADMIN_PASSWORD)
            .await
            .unwrap();

        Self {
            router: build_router(state, &["*".to_string()]),
            clock,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN, ADMIN_PASSWORD).await
    }
}

fn banner_body(title: &str, tag_ids: &[i64]) -> Value {
    json!({
        "feature_id": 1,
        "tag_ids": tag_ids,
        "content": { "title": title, "url": "https://example.com" },
        "is_active": true
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "ok" }));
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "alice", "password": "wonder1and" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "alice");
    assert_eq!(body["role"], "user");
    let user_id = body["user_id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "wonder1and" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 600);
    assert_eq!(body["user_id"].as_i64(), Some(user_id));
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_rejections() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "bob", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": ADMIN, "password": "another1pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": ADMIN, "password": "wrong1password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/user_banner?feature_id=1&tag_id=1", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");

    let (status, _) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=1",
            Some("not-a-jwt"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/banner", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_refuse_regular_users() {
    let app = TestApp::new().await;
    app.send(
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "carol", "password": "carol2024" })),
    )
    .await;
    let token = app.login("carol", "carol2024").await;

    let (status, body) = app.send(Method::GET, "/banner", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(
            Method::POST,
            "/banner",
            Some(&token),
            Some(banner_body("promo", &[1])),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/tag",
            Some(&token),
            Some(json!({ "name": "vip" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The read path is open to any authenticated principal
    let (status, _) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=1",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_banner_lifecycle_through_cache() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/banner",
            Some(&token),
            Some(banner_body("v1", &[2, 1])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let banner_id = body["banner_id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=2",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "title": "v1", "url": "https://example.com" }));

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/banner/{}", banner_id),
            Some(&token),
            Some(banner_body("v2", &[2])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banner_id"].as_i64(), Some(banner_id));
    assert_eq!(body["tag_ids"], json!([2]));
    assert_eq!(body["content"]["title"], "v2");

    // Cached copy is still served
    let (_, body) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=2",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["title"], "v1");

    let (_, body) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=2&use_last_revision=true",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["title"], "v2");

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/banner/{}", banner_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/banner/{}", banner_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.clock.advance(DEFAULT_CACHE_TTL);
    let (status, _) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=2",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_banner_parameter_errors() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    for uri in [
        "/user_banner?tag_id=1",
        "/user_banner?feature_id=x&tag_id=1",
        "/user_banner?feature_id=1&tag_id=0",
        "/user_banner?feature_id=-3&tag_id=1",
    ] {
        let (status, body) = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert!(body["error"].is_string());
    }

    let (status, body) = app
        .send(
            Method::GET,
            "/user_banner?feature_id=1&tag_id=1",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_listing_filters_and_paging() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    for (title, tags) in [("a", vec![1]), ("b", vec![2]), ("c", vec![1, 2])] {
        let (status, _) = app
            .send(Method::POST, "/banner", Some(&token), Some(banner_body(title, &tags)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.send(Method::GET, "/banner", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["banner_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let (_, body) = app
        .send(Method::GET, "/banner?tag_id=1&limit=1&offset=1", Some(&token), None)
        .await;
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["content"]["title"], "c");
    assert_eq!(page[0]["tag_ids"], json!([1, 2]));

    let (status, _) = app
        .send(Method::GET, "/banner?limit=ten", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/banner?offset=-1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_banner_write_validation() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    // Unknown feature
    let (status, _) = app
        .send(
            Method::POST,
            "/banner",
            Some(&token),
            Some(json!({ "feature_id": 99, "tag_ids": [1], "content": {} })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No tags
    let (status, _) = app
        .send(Method::POST, "/banner", Some(&token), Some(banner_body("x", &[])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PATCH,
            "/banner/abc",
            Some(&token),
            Some(banner_body("x", &[1])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PATCH,
            "/banner/404",
            Some(&token),
            Some(banner_body("x", &[1])),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.send(Method::GET, "/banner", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_catalog_creation() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/feature",
            Some(&token),
            Some(json!({ "name": "  onboarding " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "feature_id": 2, "name": "onboarding" }));

    let (status, body) = app
        .send(Method::POST, "/tag", Some(&token), Some(json!({ "name": "vip" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "tag_id": 3, "name": "vip" }));

    let (status, _) = app
        .send(Method::POST, "/tag", Some(&token), Some(json!({ "name": "vip" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::POST, "/feature", Some(&token), Some(json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
