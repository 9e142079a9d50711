//! In-memory response caching.
//!
//! `ResponseCache` keeps validated backend responses around for a few
//! minutes so repeated page loads within a session skip the network.
//! `CacheKey` builds the deterministic identity string for each cacheable
//! request. The cache is advisory only: a hit returns exactly what a fresh
//! fetch would have.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::ResponseCache;
