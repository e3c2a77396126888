//! HTTP Response DTOs

use serde::Serialize;
use std::collections::BTreeMap;

/// `GET /` response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub title: &'static str,
    pub versions: BTreeMap<&'static str, String>,
}

/// `GET /v0` response
#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteInfo>,
}

/// One public route in the listing
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub name: &'static str,
    pub rule: &'static str,
    pub methods: &'static str,
    pub doc: &'static str,
}

/// `GET /v0/reverse/:query` response
#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub reverse: String,
}
