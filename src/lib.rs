//! Shared client core for the reviews console and the client portal.
//!
//! Both dashboards talk to the same REST backend; this crate owns the
//! pieces they have in common:
//!
//! - [`api`]: typed client with bearer-token injection, a single 401
//!   interception point, and a cached variant for the read endpoints
//! - [`auth`]: login status machine with a disk-persisted token
//! - [`cache`]: short-lived in-memory response cache
//! - [`models`]: the backend's response shapes
//! - [`schema`]: declarative shape checking at the response boundary
//!
//! The application root wires these together: open a [`SessionStore`],
//! build an [`ApiClient`] over it, and wrap that in a [`CachedClient`]
//! sharing one [`ResponseCache`].

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod schema;

pub use api::{ApiClient, ApiError, CachedClient};
pub use auth::{AuthStatus, SessionStore};
pub use cache::{CacheKey, ResponseCache};
pub use config::Config;
pub use schema::SchemaMismatch;
