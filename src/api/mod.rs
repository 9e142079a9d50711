//! REST API client module for the dashboard backend.
//!
//! `ApiClient` talks to the portal REST API using JWT bearer
//! authentication; every outbound request picks up the current session
//! token and every inbound 401 forces a logout. `CachedClient` layers the
//! response cache on top for the read endpoints.

pub mod cached;
pub mod client;
pub mod error;

pub use cached::CachedClient;
pub use client::ApiClient;
pub use error::ApiError;
