//! Query text and search mode types shared by the adapters and dispatcher.

pub mod types;

pub use types::*;
