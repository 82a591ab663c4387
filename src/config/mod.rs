//! Configuration loading for trisearch.

mod settings;

pub use settings::*;
