//! Handlers for `/categories` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/categories` | Administrators only |
//! | `PATCH`  | `/categories` | Body: [`CategorySearch`] |
//! | `GET`    | `/categories/{id}` | Deleted or inactive: 404 for members |
//! | `PUT`    | `/categories/{id}` | Body: [`CategoryPatch`] |
//! | `DELETE` | `/categories/{id}` | Soft delete; 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  board::{Category, CategoryPatch, NewCategory},
  query::Paginated,
  search::CategorySearch,
  store::BoardStore,
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewCategory>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let category = state.forum.create_category(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(category)))
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<CategorySearch>,
) -> Result<Json<Paginated<Category>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_categories(&viewer, &body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Category>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_category(&viewer, id).await?))
}

pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
  Payload(body): Payload<CategoryPatch>,
) -> Result<Json<Category>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.update_category(&viewer, id, body).await?))
}

pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BoardStore + 'static,
{
  state.forum.delete_category(&viewer, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
