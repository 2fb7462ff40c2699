//! Handlers for `/topics` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/topics` | Body: [`NewTopic`]; unknown tags are created |
//! | `PATCH`  | `/topics` | Body: [`TopicSearch`] |
//! | `GET`    | `/topics/{id}` | |
//! | `PUT`    | `/topics/{id}` | Author, or moderator for `status` |
//! | `DELETE` | `/topics/{id}` | Soft delete; 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  board::{NewTopic, Topic, TopicPatch},
  query::Paginated,
  search::TopicSearch,
  store::BoardStore,
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewTopic>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let topic = state.forum.create_topic(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<TopicSearch>,
) -> Result<Json<Paginated<Topic>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_topics(&viewer, &body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Topic>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_topic(&viewer, id).await?))
}

pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
  Payload(body): Payload<TopicPatch>,
) -> Result<Json<Topic>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.update_topic(&viewer, id, body).await?))
}

pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BoardStore + 'static,
{
  state.forum.delete_topic(&viewer, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
