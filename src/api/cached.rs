//! Cached wrapper around the API client.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::models::{Client, ReportSummary, ReviewsResponse, TimeGrouping, UserStatsResponse};

use super::{ApiClient, ApiError};

/// API client with a read-through response cache.
///
/// Read endpoints consult the cache before touching the network; login and
/// report HTML always go to the backend. A hit returns exactly what the
/// corresponding fetch returned when it was stored - the cache only ever
/// saves a round trip.
#[derive(Clone)]
pub struct CachedClient {
    inner: ApiClient,
    cache: Arc<ResponseCache>,
}

impl CachedClient {
    /// Wrap `inner` with the application's cache instance.
    pub fn new(inner: ApiClient, cache: Arc<ResponseCache>) -> Self {
        Self { inner, cache }
    }

    /// The uncached client, for callers that need to force a fetch.
    pub fn inner(&self) -> &ApiClient {
        &self.inner
    }

    /// Log in; never cached.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        self.inner.login(email, password).await
    }

    /// Clear the session and drop every cached response.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.cache.clear();
        self.inner.session().logout()
    }

    pub async fn fetch_clients(&self) -> Result<Vec<Client>, ApiError> {
        let inner = self.inner.clone();
        self.read_through(CacheKey::Clients, move || async move {
            inner.fetch_clients().await
        })
        .await
    }

    pub async fn fetch_user_stats(
        &self,
        start_day: &str,
        end_day: &str,
        grouping: TimeGrouping,
    ) -> Result<UserStatsResponse, ApiError> {
        let key = CacheKey::UserStats {
            start_day,
            end_day,
            grouping,
        };
        let inner = self.inner.clone();
        let (start, end) = (start_day.to_string(), end_day.to_string());
        self.read_through(key, move || async move {
            inner.fetch_user_stats(&start, &end, grouping).await
        })
        .await
    }

    pub async fn fetch_reviews(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<ReviewsResponse, ApiError> {
        let key = CacheKey::Reviews {
            start_time,
            end_time,
        };
        let inner = self.inner.clone();
        let (start, end) = (start_time.to_string(), end_time.to_string());
        self.read_through(key, move || async move {
            inner.fetch_reviews(&start, &end).await
        })
        .await
    }

    pub async fn fetch_reports(
        &self,
        client_id: Option<i64>,
    ) -> Result<Vec<ReportSummary>, ApiError> {
        let inner = self.inner.clone();
        self.read_through(CacheKey::Reports { client_id }, move || async move {
            inner.fetch_reports(client_id).await
        })
        .await
    }

    /// Not cached - rendered HTML is fetched on demand.
    pub async fn fetch_report_html(&self, report_id: i64) -> Result<String, ApiError> {
        self.inner.fetch_report_html(report_id).await
    }

    async fn read_through<T, F, Fut>(&self, key: CacheKey<'_>, fetch: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let key = key.build();
        if let Some(hit) = self.cache.get(&key) {
            match serde_json::from_value(hit) {
                Ok(value) => {
                    debug!(key = %key, "serving response from cache");
                    return Ok(value);
                }
                // treat unreadable entries as a miss, never an error
                Err(err) => warn!(key = %key, error = %err, "discarding unreadable cache entry"),
            }
        }

        let value = fetch().await?;
        match serde_json::to_value(&value) {
            Ok(raw) => self.cache.set(&key, raw),
            Err(err) => warn!(key = %key, error = %err, "failed to store response in cache"),
        }
        Ok(value)
    }
}
