//! Report lookup endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::header,
};
use testhub_api_models::ResultsResponse;
use testhub_core::Category;

use crate::http::constants::NO_STORE;
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// `GET /results/{category}/{filename}`.
pub(crate) async fn get_results(
    State(state): State<Arc<ApiState>>,
    Path((category, filename)): Path<(String, String)>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<ResultsResponse>), ApiError> {
    let category: Category = category.parse()?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let lookup = state.relay.lookup(&filename, category, &cancel).await?;
    Ok((
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ResultsResponse::from_lookup(category, &filename, lookup)),
    ))
}
