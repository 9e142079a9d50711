//! API client for the dashboard backend.
//!
//! One method per endpoint, each returning a validated, typed result.
//! Bearer-token injection and 401 handling live in two choke points
//! (`authorize` and `check_response`) rather than per call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{
    Client, ClientsResponse, ReportSummary, ReportsResponse, ReviewsResponse, TimeGrouping,
    UserStatsResponse,
};
use crate::schema::{self, Field, Shape, Validated};

use super::ApiError;

/// Hook invoked after a 401 clears the session; the host application
/// navigates to its login surface here.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

impl Validated for LoginResponse {
    const SHAPE: Shape = Shape::Object(&[Field::required("token", Shape::String)]);
}

/// Typed client for the portal backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    /// Create a client against `config`'s backend, reading and writing the
    /// given session store.
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            on_unauthorized: None,
        })
    }

    /// Register the login-redirect hook fired whenever any call comes back
    /// unauthorized.
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Outbound interception point: every request picks up the current
    /// bearer token here, never per method.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Inbound interception point. A 401 from any endpoint clears the
    /// session and fires the redirect hook, once, before the error
    /// surfaces.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("request came back 401, clearing session");
            self.session.invalidate();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(request).send().await?;
        self.check_response(response).await
    }

    async fn get_validated<T: Validated>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path)).query(query)).await?;
        let raw: Value = response.json().await?;
        Ok(schema::validate(raw)?)
    }

    // ===== Endpoints =====

    /// Exchange credentials for a bearer token.
    ///
    /// Drives the session status machine: loading on entry, success with
    /// the token committed on a validated response, error on any failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        self.session.begin_login();
        match self.try_login(email, password).await {
            Ok(token) => {
                self.session.complete_login(token.clone());
                Ok(token)
            }
            Err(err) => {
                self.session.fail_login();
                Err(err)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.send(self.http.post(self.url("/login")).json(&body)).await?;
        let raw: Value = response.json().await?;
        let login: LoginResponse = schema::validate(raw)?;
        debug!("login accepted");
        Ok(login.token)
    }

    /// Fetch the clients visible to the logged-in user
    pub async fn fetch_clients(&self) -> Result<Vec<Client>, ApiError> {
        let response: ClientsResponse = self.get_validated("/auth/clients", &[]).await?;
        Ok(response.clients)
    }

    /// Fetch per-client send/request counts bucketed by `grouping`
    pub async fn fetch_user_stats(
        &self,
        start_day: &str,
        end_day: &str,
        grouping: TimeGrouping,
    ) -> Result<UserStatsResponse, ApiError> {
        self.get_validated(
            "/auth/userstats",
            &[
                ("start_day", start_day.to_string()),
                ("end_day", end_day.to_string()),
                ("time_grouping", grouping.to_string()),
            ],
        )
        .await
    }

    /// Fetch review-rating buckets and profile-click insights per location
    pub async fn fetch_reviews(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<ReviewsResponse, ApiError> {
        self.get_validated(
            "/auth/reviews",
            &[
                ("start_time", start_time.to_string()),
                ("end_time", end_time.to_string()),
            ],
        )
        .await
    }

    /// Fetch report summaries, optionally narrowed to one client
    pub async fn fetch_reports(
        &self,
        client_id: Option<i64>,
    ) -> Result<Vec<ReportSummary>, ApiError> {
        let mut query = Vec::new();
        if let Some(id) = client_id {
            query.push(("client_id", id.to_string()));
        }
        let response: ReportsResponse = self.get_validated("/auth/reports", &query).await?;
        Ok(response.reports)
    }

    /// Fetch rendered report HTML, passed through verbatim with no schema
    /// validation.
    pub async fn fetch_report_html(&self, report_id: i64) -> Result<String, ApiError> {
        let response = self
            .send(self.http.get(self.url(&format!("/auth/reports/{report_id}/html"))))
            .await?;
        Ok(response.text().await?)
    }
}
