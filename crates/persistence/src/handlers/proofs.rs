//! Proof filter handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::Deserialize;

use super::{found, rejected};
use crate::controller::RecordController;
use pandamonium_common::{errors::Result, Proof};

#[derive(Debug, Deserialize)]
pub struct BranchQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TheoremNameQuery {
    pub theorem_name: Option<String>,
}

/// `GET /proofs/branch?branch=`
pub async fn find_by_branch(
    State(controller): State<RecordController<Proof>>,
    query: std::result::Result<Query<BranchQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(rejected)?;
    Ok(found(controller.find_by_branch(query.branch).await?))
}

/// `GET /proofs/theorem_name?theorem_name=`
pub async fn find_by_theorem_name(
    State(controller): State<RecordController<Proof>>,
    query: std::result::Result<Query<TheoremNameQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(rejected)?;
    Ok(found(controller.find_by_theorem_name(query.theorem_name).await?))
}
