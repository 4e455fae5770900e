//! Grievance retrieval endpoints
//!
//! GET /grievances/recent, /grievances/search, /grievances/category/:category,
//! /grievances/:id

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use grievance_common::GrievanceRecord;
use serde::{Deserialize, Serialize};

use crate::db::grievances;
use crate::error::ApiResult;
use crate::AppState;

const DEFAULT_RECENT_LIMIT: i64 = 10;
const MAX_RECENT_LIMIT: i64 = 100;

/// GET /grievances/recent query
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// GET /grievances/search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// List response shared by the retrieval endpoints
#[derive(Debug, Serialize)]
pub struct GrievanceListResponse {
    pub grievances: Vec<GrievanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// GET /grievances/recent?limit=N
///
/// Newest first; `limit` is clamped to 1..=100.
pub async fn recent_grievances(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<GrievanceListResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);

    let grievances = grievances::recent_grievances(&state.db, limit).await?;
    Ok(Json(GrievanceListResponse {
        grievances,
        query: None,
    }))
}

/// GET /grievances/search?q=term
pub async fn search_grievances(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<GrievanceListResponse>> {
    let grievances = grievances::search_grievances(&state.db, &query.q).await?;
    Ok(Json(GrievanceListResponse {
        grievances,
        query: Some(query.q),
    }))
}

/// GET /grievances/category/:category
pub async fn grievances_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<GrievanceListResponse>> {
    let grievances = grievances::grievances_by_category(&state.db, &category).await?;
    Ok(Json(GrievanceListResponse {
        grievances,
        query: None,
    }))
}

/// GET /grievances/:id
pub async fn get_grievance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<GrievanceRecord>> {
    let record = grievances::find_grievance(&state.db, id).await?;
    Ok(Json(record))
}

/// Build retrieval routes
pub fn grievance_routes() -> Router<AppState> {
    Router::new()
        .route("/grievances/recent", get(recent_grievances))
        .route("/grievances/search", get(search_grievances))
        .route("/grievances/category/:category", get(grievances_by_category))
        .route("/grievances/:id", get(get_grievance))
}
