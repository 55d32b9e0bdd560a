//! Discovery orchestration: per-query dispatch and the fallback chain.
//!
//! [`dispatch`] fans a query out to every provider concurrently;
//! [`FallbackOrchestrator`] wraps it in the ordered chain of progressively
//! more generic sources. The helpers in [`dedup`] and [`url_normalize`] are
//! shared by extraction and embed resolution.

pub mod dedup;
pub mod dispatch;
pub mod fallback;
pub mod url_normalize;

pub use dispatch::{dispatch, encode_query};
pub use fallback::FallbackOrchestrator;
