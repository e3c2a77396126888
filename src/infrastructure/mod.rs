//! Infrastructure Layer
//!
//! Concrete implementations of the ports plus the HTTP surface.

pub mod adapters;
pub mod http;
