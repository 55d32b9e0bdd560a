//! Web search engines used as discovery fallbacks.

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoEngine;
