//! Handlers shared by every record kind

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{found, rejected};
use crate::controller::RecordController;
use pandamonium_common::{
    errors::Result,
    records::Record,
};

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

/// `GET /{base}`
pub async fn list<R: Record>(State(controller): State<RecordController<R>>) -> Result<Json<Vec<R>>> {
    Ok(Json(controller.list().await?))
}

/// `GET /{base}/id?id=`
pub async fn get_by_query<R: Record>(
    State(controller): State<RecordController<R>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(rejected)?;
    Ok(found(controller.get_by_id(query.id).await?))
}

/// `GET /{base}/{id}`
pub async fn get_by_path<R: Record>(
    State(controller): State<RecordController<R>>,
    id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Response> {
    let Path(id) = id.map_err(rejected)?;
    Ok(found(controller.get_by_id(Some(id)).await?))
}

/// `POST /{base}`
pub async fn create<R: Record>(
    State(controller): State<RecordController<R>>,
    payload: std::result::Result<Json<Option<R::Patch>>, JsonRejection>,
) -> Result<(StatusCode, Json<R>)> {
    let Json(payload) = payload.map_err(rejected)?;
    let created = controller.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /{base}/{id}`
pub async fn update<R: Record>(
    State(controller): State<RecordController<R>>,
    id: std::result::Result<Path<i32>, PathRejection>,
    payload: std::result::Result<Json<Option<R::Patch>>, JsonRejection>,
) -> Result<Response> {
    let Path(id) = id.map_err(rejected)?;
    let Json(payload) = payload.map_err(rejected)?;
    Ok(found(controller.update(Some(id), payload).await?))
}

/// `DELETE /{base}/{id}`
pub async fn delete<R: Record>(
    State(controller): State<RecordController<R>>,
    id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Response> {
    let Path(id) = id.map_err(rejected)?;
    controller.delete(Some(id)).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
