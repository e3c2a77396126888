//! HTTP Routes
//!
//! Router wiring plus the static route table backing the `/v0` listing
//! endpoint. The table is built once at compile time and treated as
//! read-only metadata; the listing never introspects live handlers.

use axum::{routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// One entry in the route table.
pub struct RouteEntry {
    pub name: &'static str,
    pub rule: &'static str,
    pub methods: &'static str,
    pub doc: &'static str,
    /// Internal routes are hidden from the listing endpoint.
    pub internal: bool,
}

/// Every registered route, public and internal.
///
/// Must stay in sync with [`create_routes`].
pub const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry {
        name: "root",
        rule: "/",
        methods: "GET",
        doc: "API index: title and available versions.",
        internal: false,
    },
    RouteEntry {
        name: "routes",
        rule: "/v0",
        methods: "GET",
        doc: "List the public routes under the v0 prefix.",
        internal: false,
    },
    RouteEntry {
        name: "reverse",
        rule: "/v0/reverse/:query",
        methods: "GET",
        doc: "Return the reversed query string provided (for testing purposes).",
        internal: false,
    },
    RouteEntry {
        name: "get_note",
        rule: "/v0/:note",
        methods: "GET",
        doc: "Synthesize a note and return it as an audio file download.",
        internal: false,
    },
    RouteEntry {
        name: "alexa_note",
        rule: "/v0/alexa/:note",
        methods: "GET",
        doc: "Note synthesis with fixed encoding parameters for Alexa playback.",
        internal: false,
    },
    RouteEntry {
        name: "catch_all",
        rule: "/*path",
        methods: "GET,POST",
        doc: "Reject any unknown API call with a 404 error.",
        internal: true,
    },
];

/// Create all routes.
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/v0", get(handlers::list_routes))
        .route("/v0/reverse/:query", get(handlers::reverse))
        .route("/v0/alexa/:note", get(handlers::alexa_note))
        .route("/v0/:note", get(handlers::get_note))
        .fallback(handlers::catch_all)
}
