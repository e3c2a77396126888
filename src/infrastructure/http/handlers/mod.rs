//! HTTP Handlers

mod meta;
mod note;

pub use meta::*;
pub use note::*;
