//! AppSignal API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use toolbelt_core::{Error, Paginated, Result, Scan};
use tracing::debug;

use crate::types::{App, ExceptionIncident, IncidentList, IncidentQuery, PerformanceIncident};
use crate::SERVICE;

/// Operations the AppSignal tools need.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppSignalApi: Send + Sync {
    /// List the applications the token can see.
    async fn list_apps(&self) -> Result<Vec<App>>;

    /// One page of exception incidents.
    async fn list_exception_incidents(
        &self,
        app_id: &str,
        query: IncidentQuery,
    ) -> Result<Vec<ExceptionIncident>>;

    /// One page of performance incidents.
    async fn list_performance_incidents(
        &self,
        app_id: &str,
        query: IncidentQuery,
    ) -> Result<Vec<PerformanceIncident>>;
}

/// AppSignal REST client.
pub struct AppSignalClient {
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

impl AppSignalClient {
    /// Create a client for `base_url` (e.g. `https://appsignal.com`).
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            Error::Config(format!("Invalid AppSignal base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid AppSignal base URL '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent("toolbelt")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: token.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL under `/api` for path segments. Each segment is percent-encoded,
    /// so an app ID can never leave its own segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a valid AppSignal path segment",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid AppSignal base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET. The token travels as a query parameter and is
    /// never logged.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments)?;
        debug!(path = url.path(), "AppSignal GET request");

        let response = self
            .client
            .get(url)
            .query(&[("token", self.token.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(SERVICE, status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse AppSignal response: {}", e)))
    }
}

#[async_trait]
impl AppSignalApi for AppSignalClient {
    async fn list_apps(&self) -> Result<Vec<App>> {
        self.get(&["applications.json"], &[]).await
    }

    async fn list_exception_incidents(
        &self,
        app_id: &str,
        query: IncidentQuery,
    ) -> Result<Vec<ExceptionIncident>> {
        let segments = [app_id, "incidents", "exceptions.json"];
        let list: IncidentList<ExceptionIncident> =
            self.get(&segments, &query.to_params()).await?;
        Ok(list.incidents)
    }

    async fn list_performance_incidents(
        &self,
        app_id: &str,
        query: IncidentQuery,
    ) -> Result<Vec<PerformanceIncident>> {
        let segments = [app_id, "incidents", "performance.json"];
        let list: IncidentList<PerformanceIncident> =
            self.get(&segments, &query.to_params()).await?;
        Ok(list.incidents)
    }
}

// =============================================================================
// Lookup by incident number
// =============================================================================

// The API has no fetch-by-number endpoint for incidents, so lookups scan
// the listings page by page.

struct ExceptionPages<'a> {
    api: &'a dyn AppSignalApi,
    app_id: &'a str,
}

#[async_trait]
impl Paginated for ExceptionPages<'_> {
    type Item = ExceptionIncident;

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<ExceptionIncident>> {
        self.api
            .list_exception_incidents(self.app_id, page_query(offset, limit))
            .await
    }
}

struct PerformancePages<'a> {
    api: &'a dyn AppSignalApi,
    app_id: &'a str,
}

#[async_trait]
impl Paginated for PerformancePages<'_> {
    type Item = PerformanceIncident;

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<PerformanceIncident>> {
        self.api
            .list_performance_incidents(self.app_id, page_query(offset, limit))
            .await
    }
}

fn page_query(offset: usize, limit: usize) -> IncidentQuery {
    IncidentQuery {
        state: None,
        limit: Some(u32::try_from(limit).unwrap_or(u32::MAX)),
        offset: Some(u32::try_from(offset).unwrap_or(u32::MAX)),
    }
}

/// Find an exception incident by number.
pub async fn find_exception_incident(
    api: &dyn AppSignalApi,
    app_id: &str,
    number: u64,
    scan: Scan,
) -> Result<ExceptionIncident> {
    let pages = ExceptionPages { api, app_id };
    scan.find(
        &pages,
        |incident| incident.number == number,
        "Exception incident",
        &number.to_string(),
    )
    .await
}

/// Find a performance incident by number.
pub async fn find_performance_incident(
    api: &dyn AppSignalApi,
    app_id: &str,
    number: u64,
    scan: Scan,
) -> Result<PerformanceIncident> {
    let pages = PerformancePages { api, app_id };
    scan.find(
        &pages,
        |incident| incident.number == number,
        "Performance incident",
        &number.to_string(),
    )
    .await
}
