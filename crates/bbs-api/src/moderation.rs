//! Handlers for `/moderation` endpoints. Moderators and administrators only.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/moderation/actions` | Body: [`NewAction`]; closes the referenced report |
//! | `PATCH` | `/moderation/actions` | Body: [`ActionSearch`] |
//! | `POST`  | `/moderation/suspensions` | Body: [`NewSuspension`] |
//! | `PATCH` | `/moderation/suspensions` | Body: [`SuspensionSearch`] |
//! | `POST`  | `/moderation/suspensions/{id}/lift` | 409 if already lifted |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  moderation::{ModerationAction, NewAction, NewSuspension, Suspension},
  query::Paginated,
  search::{ActionSearch, SuspensionSearch},
  store::BoardStore,
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

// ─── Actions ─────────────────────────────────────────────────────────────────

pub async fn act<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewAction>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let action = state.forum.moderate(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(action)))
}

pub async fn search_actions<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<ActionSearch>,
) -> Result<Json<Paginated<ModerationAction>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_actions(&viewer, &body).await?))
}

// ─── Suspensions ─────────────────────────────────────────────────────────────

pub async fn suspend<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewSuspension>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let suspension = state.forum.suspend_member(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(suspension)))
}

pub async fn search_suspensions<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<SuspensionSearch>,
) -> Result<Json<Paginated<Suspension>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_suspensions(&viewer, &body).await?))
}

pub async fn lift<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Suspension>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.lift_suspension(&viewer, id).await?))
}
