//! JSON REST API for the bulletin board.
//!
//! Exposes an axum [`Router`] backed by any [`bbs_core::store::BoardStore`].
//! Every handler makes exactly one [`Forum`] call; access rules live there.
//! TLS and request logging are the caller's responsibility.
//!
//! Collections follow one convention: `POST` creates, `PATCH` searches with
//! a JSON filter body, and `GET`/`PUT`/`DELETE` on `/{id}` read, update and
//! soft-delete.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bbs_api::api_router(state))
//! ```

pub mod auth;
pub mod categories;
pub mod error;
pub mod members;
pub mod moderation;
pub mod replies;
pub mod reports;
pub mod tags;
pub mod topics;

use std::sync::Arc;

use axum::{
  Router,
  extract::{FromRequest, FromRequestParts},
  routing::{get, patch, post, put},
};
use bbs_core::{forum::Forum, store::BoardStore};

pub use auth::{Auth, AuthConfig};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub forum: Forum<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { forum: self.forum.clone(), auth: Arc::clone(&self.auth) }
  }
}

impl<S: BoardStore> ApiState<S> {
  pub fn new(store: Arc<S>, auth: AuthConfig) -> Self {
    Self { forum: Forum::new(store), auth: Arc::new(auth) }
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// JSON request body whose rejections use the API's error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

/// Path parameters whose rejections use the API's error shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Ids<T>(pub T);

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: BoardStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    // Members
    .route("/members", patch(members::search::<S>))
    .route("/members/{id}", get(members::get_one::<S>).put(members::update::<S>))
    .route("/members/{id}/role", put(members::set_role::<S>))
    // Categories
    .route(
      "/categories",
      post(categories::create::<S>).patch(categories::search::<S>),
    )
    .route(
      "/categories/{id}",
      get(categories::get_one::<S>)
        .put(categories::update::<S>)
        .delete(categories::delete::<S>),
    )
    // Topics
    .route("/topics", post(topics::create::<S>).patch(topics::search::<S>))
    .route(
      "/topics/{id}",
      get(topics::get_one::<S>)
        .put(topics::update::<S>)
        .delete(topics::delete::<S>),
    )
    // Replies
    .route(
      "/topics/{topic_id}/replies",
      post(replies::create::<S>).patch(replies::search::<S>),
    )
    .route(
      "/topics/{topic_id}/replies/{reply_id}",
      get(replies::get_one::<S>)
        .put(replies::update::<S>)
        .delete(replies::delete::<S>),
    )
    // Tags
    .route("/tags", post(tags::create::<S>).patch(tags::search::<S>))
    .route("/tags/{id}", get(tags::get_one::<S>))
    // Reports
    .route("/reports", post(reports::create::<S>).patch(reports::search::<S>))
    .route("/reports/{id}", get(reports::get_one::<S>))
    // Moderation
    .route(
      "/moderation/actions",
      post(moderation::act::<S>).patch(moderation::search_actions::<S>),
    )
    .route(
      "/moderation/suspensions",
      post(moderation::suspend::<S>).patch(moderation::search_suspensions::<S>),
    )
    .route("/moderation/suspensions/{id}/lift", post(moderation::lift::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
