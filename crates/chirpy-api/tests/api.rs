use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use chirpy_api::{AppStateInner, router};
use chirpy_auth::TokenIssuer;
use chirpy_db::{ContentFilter, Database};

struct TestApp {
    app: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Chirpy</h1>").unwrap();
        let db = Database::open(
            dir.path().join("database.json"),
            ContentFilter::new(["kerfuffle", "sharbert", "fornax"]),
        )
        .unwrap();
        let state = AppStateInner::new(db, TokenIssuer::new("test-secret"));
        Self {
            app: router(state, dir.path()),
            _dir: dir,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup_and_login(&self, email: &str) -> (String, String) {
        let creds = json!({ "email": email, "password": "secret123" });
        let (status, _) = self
            .send(Method::POST, "/api/users", None, Some(creds.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.send(Method::POST, "/api/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
        (
            body["token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn healthz() {
    let app = TestApp::new();
    let res = app
        .app
        .clone()
        .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn signup_hides_password_and_rejects_duplicates() {
    let app = TestApp::new();
    let creds = json!({ "email": "a@example.com", "password": "pw" });

    let (status, body) = app
        .send(Method::POST, "/api/users", None, Some(creds.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 1, "email": "a@example.com" }));

    let (status, body) = app.send(Method::POST, "/api/users", None, Some(creds)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_login_is_uniform() {
    let app = TestApp::new();
    app.signup_and_login("a@example.com").await;

    let (wrong_pw, wrong_body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "a@example.com", "password": "nope" })),
        )
        .await;
    let (no_user, no_user_body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "nope" })),
        )
        .await;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, no_user_body);
}

#[tokio::test]
async fn chirp_lifecycle() {
    let app = TestApp::new();
    let (token, _) = app.signup_and_login("a@example.com").await;

    let (status, chirp) = app
        .send(
            Method::POST,
            "/api/chirps",
            Some(&token),
            Some(json!({ "body": "I kerfuffle you" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "I **** you");
    assert_eq!(chirp["author_id"], 1);

    let (status, list) = app.send(Method::GET, "/api/chirps", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, got) = app.send(Method::GET, "/api/chirps/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(got, chirp);

    let (status, _) = app
        .send(Method::DELETE, "/api/chirps/1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, "/api/chirps/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chirp_rules() {
    let app = TestApp::new();
    let (alice, _) = app.signup_and_login("alice@example.com").await;
    let (bob, _) = app.signup_and_login("bob@example.com").await;

    let (status, _) = app
        .send(Method::POST, "/api/chirps", None, Some(json!({ "body": "hi" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/chirps",
            Some(&alice),
            Some(json!({ "body": "x".repeat(141) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.send(
        Method::POST,
        "/api/chirps",
        Some(&alice),
        Some(json!({ "body": "alice was here" })),
    )
    .await;
    let (status, _) = app
        .send(Method::DELETE, "/api/chirps/1", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, by_bob) = app
        .send(Method::GET, "/api/chirps?author_id=2", None, None)
        .await;
    assert!(by_bob.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn refresh_and_revoke() {
    let app = TestApp::new();
    let (_, refresh) = app.signup_and_login("a@example.com").await;

    let (status, body) = app
        .send(Method::POST, "/api/refresh", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/chirps",
            Some(&access),
            Some(json!({ "body": "fresh token" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(Method::POST, "/api/revoke", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/revoke", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_user_logs_out() {
    let app = TestApp::new();
    let (access, refresh) = app.signup_and_login("a@example.com").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/users",
            Some(&access),
            Some(json!({ "email": "b@example.com", "password": "newpass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "email": "b@example.com" }));

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "b@example.com", "password": "newpass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let app = TestApp::new();
    for _ in 0..3 {
        let res = app
            .app
            .clone()
            .oneshot(Request::get("/app/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app
        .app
        .clone()
        .oneshot(Request::get("/admin/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let html = res.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&html).contains("visited 3 times"));

    let res = app
        .app
        .clone()
        .oneshot(
            Request::post("/api/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let text = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&text[..], b"Hits count was 3, now reset to 0");
}
