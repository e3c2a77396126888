//! Meta Handlers
//!
//! Self-describing endpoints: API index, route listing, reverse-echo and
//! the catch-all rejection.

use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::infrastructure::http::dto::{
    ReverseResponse, RootResponse, RouteInfo, RouteListResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::routes::ROUTE_TABLE;
use crate::infrastructure::http::state::AppState;

pub const API_TITLE: &str = "Pitchpipe RESTful API";

/// API index: title and version-to-URL map.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    let mut versions = BTreeMap::new();
    versions.insert("v0", format!("{}/v0", state.public_base_url));
    Json(RootResponse {
        title: API_TITLE,
        versions,
    })
}

/// List the public routes under the v0 prefix.
pub async fn list_routes() -> Json<RouteListResponse> {
    let routes = ROUTE_TABLE
        .iter()
        .filter(|r| !r.internal && r.rule.starts_with("/v0"))
        .map(|r| RouteInfo {
            name: r.name,
            rule: r.rule,
            methods: r.methods,
            doc: r.doc,
        })
        .collect();
    Json(RouteListResponse { routes })
}

/// Return the reversed query string provided (for testing purposes).
pub async fn reverse(Path(query): Path<String>) -> Json<ReverseResponse> {
    Json(ReverseResponse {
        reverse: query.chars().rev().collect(),
    })
}

/// Reject any unknown API call with a 404 error.
pub async fn catch_all() -> ApiError {
    ApiError::NotFound("Requested API call does not exist".to_string())
}
