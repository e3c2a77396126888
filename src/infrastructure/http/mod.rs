//! HTTP Layer - RESTful API

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::{create_routes, RouteEntry, ROUTE_TABLE};
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
