//! Handlers for `/topics/{topic_id}/replies` endpoints.
//!
//! A reply id that exists under a different topic is a 404.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  board::{NewReply, Reply, ReplyPatch},
  query::Paginated,
  search::ReplySearch,
  store::BoardStore,
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(topic_id): Ids<Uuid>,
  Payload(body): Payload<NewReply>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let reply = state.forum.create_reply(&viewer, topic_id, body).await?;
  Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(topic_id): Ids<Uuid>,
  Payload(body): Payload<ReplySearch>,
) -> Result<Json<Paginated<Reply>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_replies(&viewer, topic_id, &body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids((topic_id, reply_id)): Ids<(Uuid, Uuid)>,
) -> Result<Json<Reply>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_reply(&viewer, topic_id, reply_id).await?))
}

pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids((topic_id, reply_id)): Ids<(Uuid, Uuid)>,
  Payload(body): Payload<ReplyPatch>,
) -> Result<Json<Reply>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(
    state.forum.update_reply(&viewer, topic_id, reply_id, body).await?,
  ))
}

pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids((topic_id, reply_id)): Ids<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: BoardStore + 'static,
{
  state.forum.delete_reply(&viewer, topic_id, reply_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
