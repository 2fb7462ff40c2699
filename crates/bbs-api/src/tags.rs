//! Handlers for `/tags` endpoints. Tags are also created implicitly when a
//! topic names one that does not exist yet.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  query::Paginated,
  search::TagSearch,
  store::BoardStore,
  tag::{NewTag, Tag},
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

/// `POST /tags`: moderators only; 409 if the name exists in any case.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewTag>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let tag = state.forum.create_tag(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Payload(body): Payload<TagSearch>,
) -> Result<Json<Paginated<Tag>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_tags(&body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Tag>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_tag(id).await?))
}
