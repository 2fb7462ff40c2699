//! Handlers for `/reports` endpoints. Members see only the reports they
//! filed; moderators see all of them.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use bbs_core::{
  moderation::{NewReport, Report},
  query::Paginated,
  search::ReportSearch,
  store::BoardStore,
};
use uuid::Uuid;

use crate::{ApiState, Auth, Ids, Payload, error::ApiError};

pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<NewReport>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let report = state.forum.create_report(&viewer, body).await?;
  Ok((StatusCode::CREATED, Json(report)))
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Payload(body): Payload<ReportSearch>,
) -> Result<Json<Paginated<Report>>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.search_reports(&viewer, &body).await?))
}

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Auth(viewer): Auth,
  Ids(id): Ids<Uuid>,
) -> Result<Json<Report>, ApiError>
where
  S: BoardStore + 'static,
{
  Ok(Json(state.forum.get_report(&viewer, id).await?))
}
