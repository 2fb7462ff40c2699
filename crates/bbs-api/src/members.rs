//! Handlers for `/members` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `PATCH` | `/members` | Body: [`MemberSearch`]; moderators only |
//! | `GET`   | `/members/{id}` | Any signed-in member |
//! | `PUT`   | `/members/{id}` | Self or administrator |
//! | `PUT`   | `/members/{id}/role` | Body: `{"role":"moderator"}`; administrators only |

use axum::{Json, extract::State};
use bbs_core::{
  member::{Member, MemberPatch, Role},
  query::Paginated,
  search::MemberSearch,
  store::BoardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<MemberSearch>,
) -> Result<Json<Paginated<Member>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_members(&viewer, &body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Member>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_member(&viewer, id).await?))
}

pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
  Payload(body): Payload<MemberPatch>,
) -> Result<Json<Member>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.update_profile(&viewer, id, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

pub async fn set_role<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
  Payload(body): Payload<RoleBody>,
) -> Result<Json<Member>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.set_role(&viewer, id, body.role).await?))
}
