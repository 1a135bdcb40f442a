//! npsites library
//!
//! Exposes the cache, scrapers, lookups and session for use by the binary
//! and integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod lookup;
pub mod session;
pub mod ui;
