//! Query dispatch and result aggregation.
//!
//! # Flow
//!
//! ```text
//! SearchSession::begin ──► SearchRequest
//!                               │
//!                               ▼
//!                    Dispatcher::fetch_search_results
//!                               │
//!       ┌───────────────────────┼──────────────────┐
//!       ▼                       ▼                  ▼
//!  custom branch           Google search      Bing search
//!  (clustering |
//!   expansion → relevance |
//!   relevance)
//!       └───────────────────────┼──────────────────┘
//!                               ▼
//!                         SearchOutcome ──► SearchSession::complete
//! ```
//!
//! The three branches are awaited independently and joined at the end.

mod dispatcher;
mod session;

pub use dispatcher::*;
pub use session::*;
