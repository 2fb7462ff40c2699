//! Async HTTP client wrapping the bulletin board JSON API.
//!
//! Request and response bodies are the `bbs-core` types the server speaks,
//! so callers build a [`NewTopic`] or [`TopicSearch`] exactly as a handler
//! would receive it. Any non-2xx response becomes an `Err` carrying an
//! [`ApiFailure`], which callers can recover with
//! [`anyhow::Error::downcast_ref`].

use std::time::Duration;

use anyhow::{Context, Result};
use bbs_core::{
  board::{
    Category, CategoryPatch, NewCategory, NewReply, NewTopic, Reply, ReplyPatch, Topic,
    TopicPatch,
  },
  member::{Member, MemberPatch, Registration, Role},
  moderation::{ModerationAction, NewAction, NewReport, NewSuspension, Report, Suspension},
  query::Paginated,
  search::{
    ActionSearch, CategorySearch, MemberSearch, ReplySearch, ReportSearch, SuspensionSearch,
    TagSearch, TopicSearch,
  },
  tag::{NewTag, Tag},
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// A non-success response from the API.
#[derive(Debug, Error)]
#[error("{method} {path} → {status}: {message}")]
pub struct ApiFailure {
  pub method:  Method,
  pub path:    String,
  pub status:  StatusCode,
  /// The `error` field of the response body, or the raw body.
  pub message: String,
}

/// The status code of a failed call, if the failure came from the API.
pub fn failure_status(err: &anyhow::Error) -> Option<StatusCode> {
  err.downcast_ref::<ApiFailure>().map(|f| f.status)
}

/// `{token, member}` as returned by `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
  pub token:  String,
  pub member: Member,
}

/// Async HTTP client for the board's JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  /// A guest client for the server at `base_url` (without the `/api`
  /// prefix).
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into(), token: None })
  }

  /// A copy of this client that sends `token` as a bearer token.
  pub fn with_token(&self, token: impl Into<String>) -> Self {
    Self { token: Some(token.into()), ..self.clone() }
  }

  /// A copy of this client authenticated as the session's member.
  pub fn for_session(&self, session: &Session) -> Self { self.with_token(&session.token) }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    match &self.token {
      Some(t) => req.bearer_auth(t),
      None => req,
    }
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<&impl Serialize>,
  ) -> Result<reqwest::Response> {
    let mut req = self.request(method.clone(), path);
    if let Some(b) = body {
      req = req.json(b);
    }
    let resp = req
      .send()
      .await
      .with_context(|| format!("{method} {path} failed"))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
      .ok()
      .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
      .unwrap_or(text);
    Err(ApiFailure { method, path: path.to_owned(), status, message }.into())
  }

  async fn call<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<&impl Serialize>,
  ) -> Result<T> {
    let resp = self.send(method.clone(), path, body).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising response of {method} {path}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.call(Method::GET, path, None::<&()>).await
  }

  async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
    self.call(Method::POST, path, Some(body)).await
  }

  async fn put<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
    self.call(Method::PUT, path, Some(body)).await
  }

  async fn search<T: DeserializeOwned>(
    &self,
    path: &str,
    filter: &impl Serialize,
  ) -> Result<Paginated<T>> {
    self.call(Method::PATCH, path, Some(filter)).await
  }

  async fn delete(&self, path: &str) -> Result<()> {
    self.send(Method::DELETE, path, None::<&()>).await?;
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/register`
  pub async fn register(&self, registration: &Registration) -> Result<Session> {
    self.post("/auth/register", registration).await
  }

  /// `POST /api/auth/login`
  pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
    self
      .post("/auth/login", &json!({ "username": username, "password": password }))
      .await
  }

  // ── Members ───────────────────────────────────────────────────────────────

  pub async fn get_member(&self, id: Uuid) -> Result<Member> {
    self.get(&format!("/members/{id}")).await
  }

  pub async fn search_members(&self, filter: &MemberSearch) -> Result<Paginated<Member>> {
    self.search("/members", filter).await
  }

  pub async fn update_member(&self, id: Uuid, patch: &MemberPatch) -> Result<Member> {
    self.put(&format!("/members/{id}"), patch).await
  }

  pub async fn set_role(&self, id: Uuid, role: Role) -> Result<Member> {
    self.put(&format!("/members/{id}/role"), &json!({ "role": role })).await
  }

  // ── Categories ────────────────────────────────────────────────────────────

  pub async fn create_category(&self, input: &NewCategory) -> Result<Category> {
    self.post("/categories", input).await
  }

  pub async fn search_categories(&self, filter: &CategorySearch) -> Result<Paginated<Category>> {
    self.search("/categories", filter).await
  }

  pub async fn get_category(&self, id: Uuid) -> Result<Category> {
    self.get(&format!("/categories/{id}")).await
  }

  pub async fn update_category(&self, id: Uuid, patch: &CategoryPatch) -> Result<Category> {
    self.put(&format!("/categories/{id}"), patch).await
  }

  pub async fn delete_category(&self, id: Uuid) -> Result<()> {
    self.delete(&format!("/categories/{id}")).await
  }

  // ── Topics ────────────────────────────────────────────────────────────────

  pub async fn create_topic(&self, input: &NewTopic) -> Result<Topic> {
    self.post("/topics", input).await
  }

  pub async fn search_topics(&self, filter: &TopicSearch) -> Result<Paginated<Topic>> {
    self.search("/topics", filter).await
  }

  pub async fn get_topic(&self, id: Uuid) -> Result<Topic> {
    self.get(&format!("/topics/{id}")).await
  }

  pub async fn update_topic(&self, id: Uuid, patch: &TopicPatch) -> Result<Topic> {
    self.put(&format!("/topics/{id}"), patch).await
  }

  pub async fn delete_topic(&self, id: Uuid) -> Result<()> {
    self.delete(&format!("/topics/{id}")).await
  }

  // ── Replies ───────────────────────────────────────────────────────────────

  pub async fn create_reply(&self, topic_id: Uuid, input: &NewReply) -> Result<Reply> {
    self.post(&format!("/topics/{topic_id}/replies"), input).await
  }

  pub async fn search_replies(
    &self,
    topic_id: Uuid,
    filter: &ReplySearch,
  ) -> Result<Paginated<Reply>> {
    self.search(&format!("/topics/{topic_id}/replies"), filter).await
  }

  pub async fn get_reply(&self, topic_id: Uuid, reply_id: Uuid) -> Result<Reply> {
    self.get(&format!("/topics/{topic_id}/replies/{reply_id}")).await
  }

  pub async fn update_reply(
    &self,
    topic_id: Uuid,
    reply_id: Uuid,
    patch: &ReplyPatch,
  ) -> Result<Reply> {
    self
      .put(&format!("/topics/{topic_id}/replies/{reply_id}"), patch)
      .await
  }

  pub async fn delete_reply(&self, topic_id: Uuid, reply_id: Uuid) -> Result<()> {
    self.delete(&format!("/topics/{topic_id}/replies/{reply_id}")).await
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  pub async fn create_tag(&self, input: &NewTag) -> Result<Tag> {
    self.post("/tags", input).await
  }

  pub async fn search_tags(&self, filter: &TagSearch) -> Result<Paginated<Tag>> {
    self.search("/tags", filter).await
  }

  pub async fn get_tag(&self, id: Uuid) -> Result<Tag> {
    self.get(&format!("/tags/{id}")).await
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  pub async fn create_report(&self, input: &NewReport) -> Result<Report> {
    self.post("/reports", input).await
  }

  pub async fn search_reports(&self, filter: &ReportSearch) -> Result<Paginated<Report>> {
    self.search("/reports", filter).await
  }

  pub async fn get_report(&self, id: Uuid) -> Result<Report> {
    self.get(&format!("/reports/{id}")).await
  }

  // ── Moderation ────────────────────────────────────────────────────────────

  pub async fn moderate(&self, input: &NewAction) -> Result<ModerationAction> {
    self.post("/moderation/actions", input).await
  }

  pub async fn search_actions(
    &self,
    filter: &ActionSearch,
  ) -> Result<Paginated<ModerationAction>> {
    self.search("/moderation/actions", filter).await
  }

  pub async fn suspend(&self, input: &NewSuspension) -> Result<Suspension> {
    self.post("/moderation/suspensions", input).await
  }

  pub async fn search_suspensions(
    &self,
    filter: &SuspensionSearch,
  ) -> Result<Paginated<Suspension>> {
    self.search("/moderation/suspensions", filter).await
  }

  pub async fn lift_suspension(&self, id: Uuid) -> Result<Suspension> {
    self
      .post(&format!("/moderation/suspensions/{id}/lift"), &json!({}))
      .await
  }
}
