//! HTTP API for trisearch.
//!
//! Serves the per-provider passthrough endpoints the UI panels were built
//! around, the aggregated `/search` endpoint, and service routes.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
