//! Router tests over an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use bbs_core::member::hash_password;
use bbs_store_sqlite::SqliteStore;
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, AuthConfig, api_router};

struct TestApp {
  router: Router,
}

impl TestApp {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState::new(Arc::new(store), AuthConfig::new("test-secret", Duration::hours(1)));
    state
      .forum
      .bootstrap_admin("admin", "admin@example.com", hash_password("admin-password").unwrap())
      .await
      .unwrap();
    Self { router: api_router(state) }
  }

  async fn call(
    &self,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = self
      .router
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn login(&self, username: &str, password: &str) -> String {
    let (status, body) = self
      .call(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
      )
      .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
  }

  async fn register(&self, username: &str) -> (String, String) {
    let (status, body) = self
      .call(
        "POST",
        "/auth/register",
        None,
        Some(json!({
          "username": username,
          "email": format!("{username}@example.com"),
          "password": "password123",
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
      body["token"].as_str().unwrap().to_owned(),
      body["member"]["member_id"].as_str().unwrap().to_owned(),
    )
  }

  async fn category(&self, admin: &str, name: &str) -> String {
    let (status, body) = self
      .call("POST", "/categories", Some(admin), Some(json!({ "name": name })))
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["category_id"].as_str().unwrap().to_owned()
  }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_token_and_member() {
  let app = TestApp::new().await;
  let (status, body) = app
    .call(
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": "Alice",
        "email": "alice@example.com",
        "password": "password123",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(body["token"].is_string());
  assert_eq!(body["member"]["username"], "alice");
  assert_eq!(body["member"]["role"], "member");
  assert!(body["member"].get("password_hash").is_none());
}

#[tokio::test]
async fn bad_login_is_401() {
  let app = TestApp::new().await;
  let (status, body) = app
    .call(
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn garbage_token_is_401_even_on_public_routes() {
  let app = TestApp::new().await;
  let (status, _) = app
    .call("PATCH", "/topics", Some("not-a-jwt"), Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_body_is_400_with_error_field() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let (status, body) = app
    .call("POST", "/categories", Some(&admin), Some(json!({ "nom": "x" })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_id_is_400() {
  let app = TestApp::new().await;
  let (status, _) = app.call("GET", "/topics/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn members_cannot_create_categories() {
  let app = TestApp::new().await;
  let (alice, _) = app.register("alice").await;
  let (status, _) = app
    .call("POST", "/categories", Some(&alice), Some(json!({ "name": "Mine" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guests_cannot_post() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let category_id = app.category(&admin, "General").await;
  let (status, _) = app
    .call(
      "POST",
      "/topics",
      None,
      Some(json!({ "category_id": category_id, "title": "t", "body": "b" })),
    )
    .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Search envelope ─────────────────────────────────────────────────────────

#[tokio::test]
async fn search_returns_pagination_envelope() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  for name in ["a", "b", "c"] {
    app.category(&admin, name).await;
  }

  let (status, body) = app
    .call("PATCH", "/categories", None, Some(json!({ "limit": 2 })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["pagination"], json!({
    "current": 1,
    "limit": 2,
    "records": 3,
    "pages": 2,
  }));
  assert_eq!(body["data"].as_array().unwrap().len(), 2);

  let (status, _) = app
    .call("PATCH", "/categories", None, Some(json!({ "page": 0 })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_tag_is_409() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let (status, _) = app
    .call("POST", "/tags", Some(&admin), Some(json!({ "name": "foo" })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, body) = app
    .call("POST", "/tags", Some(&admin), Some(json!({ "name": "Foo" })))
    .await;
  assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

// ─── Topics and replies ──────────────────────────────────────────────────────

#[tokio::test]
async fn deleted_topic_is_404_for_members_and_visible_to_admins() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let (alice, _) = app.register("alice").await;
  let category_id = app.category(&admin, "General").await;

  let (_, topic) = app
    .call(
      "POST",
      "/topics",
      Some(&alice),
      Some(json!({ "category_id": category_id, "title": "Hi", "body": "there" })),
    )
    .await;
  let uri = format!("/topics/{}", topic["topic_id"].as_str().unwrap());

  let (status, _) = app.call("DELETE", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = app.call("GET", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, body) = app.call("GET", &uri, Some(&admin), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["deleted_at"].is_string());
}

#[tokio::test]
async fn reply_under_wrong_topic_is_404() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let category_id = app.category(&admin, "General").await;

  let mut topic_ids = Vec::new();
  for title in ["one", "two"] {
    let (_, topic) = app
      .call(
        "POST",
        "/topics",
        Some(&admin),
        Some(json!({ "category_id": category_id, "title": title, "body": "b" })),
      )
      .await;
    topic_ids.push(topic["topic_id"].as_str().unwrap().to_owned());
  }

  let (status, reply) = app
    .call(
      "POST",
      &format!("/topics/{}/replies", topic_ids[0]),
      Some(&admin),
      Some(json!({ "body": "hello" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let reply_id = reply["reply_id"].as_str().unwrap();

  let (status, _) = app
    .call("GET", &format!("/topics/{}/replies/{reply_id}", topic_ids[1]), None, None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = app
    .call("GET", &format!("/topics/{}/replies/{reply_id}", topic_ids[0]), None, None)
    .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_changes_apply_to_tokens_already_issued() {
  let app = TestApp::new().await;
  let admin = app.login("admin", "admin-password").await;
  let (alice, alice_id) = app.register("alice").await;

  let (status, _) = app
    .call("PATCH", "/moderation/actions", Some(&alice), Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = app
    .call(
      "PUT",
      &format!("/members/{alice_id}/role"),
      Some(&admin),
      Some(json!({ "role": "moderator" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "moderator");

  let (status, _) = app
    .call("PATCH", "/moderation/actions", Some(&alice), Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::OK);

  app
    .call(
      "PUT",
      &format!("/members/{alice_id}/role"),
      Some(&admin),
      Some(json!({ "role": "member" })),
    )
    .await;
  let (status, _) = app
    .call("PATCH", "/moderation/actions", Some(&alice), Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}
