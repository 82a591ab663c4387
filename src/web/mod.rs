//! Embedded web UI: one search form over three result panels.

mod handlers;
mod static_files;

pub use handlers::*;
pub use static_files::*;
