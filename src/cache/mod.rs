//! Cache module for storing fetched responses on disk
//!
//! Every scraped page and API response is memoized in a single JSON document
//! keyed by URL or name. The document is loaded once at startup and rewritten
//! after each new entry, so an unchanged cache file replays a previous session
//! without any network access.

mod manager;
mod payload;

pub use manager::{read_entries, CacheError, ResponseCache, DEFAULT_CACHE_FILE, STATE_DIRECTORY_KEY};
pub use payload::{CachePayload, Cacheable, PayloadError, PayloadKind};
