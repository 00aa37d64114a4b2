//! Langfuse public API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use toolbelt_core::{Error, Result};
use tracing::debug;

use crate::types::{Observation, ObservationQuery, Page, Trace, TraceQuery};
use crate::SERVICE;

/// Operations the Langfuse tools need.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LangfuseApi: Send + Sync {
    async fn list_traces(&self, query: TraceQuery) -> Result<Page<Trace>>;

    /// Trace with its observations and scores.
    async fn get_trace(&self, trace_id: &str) -> Result<Trace>;

    async fn list_observations(&self, query: ObservationQuery) -> Result<Page<Observation>>;

    async fn get_observation(&self, observation_id: &str) -> Result<Observation>;
}

/// Langfuse REST client using basic auth (public key / secret key).
pub struct LangfuseClient {
    base_url: Url,
    public_key: String,
    secret_key: String,
    client: reqwest::Client,
}

impl LangfuseClient {
    pub fn new(
        base_url: &str,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid Langfuse base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid Langfuse base URL '{}'",
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
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            client,
        })
    }

    /// URL for API path segments; each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid Langfuse base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "public"])
            .extend(segments);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments)?;
        debug!(url = %url, "Langfuse GET request");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.public_key, Some(&self.secret_key))
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
            .map_err(|e| Error::InvalidData(format!("Failed to parse Langfuse response: {}", e)))
    }
}

#[async_trait]
impl LangfuseApi for LangfuseClient {
    async fn list_traces(&self, query: TraceQuery) -> Result<Page<Trace>> {
        self.get(&["traces"], &query.to_params()).await
    }

    async fn get_trace(&self, trace_id: &str) -> Result<Trace> {
        self.get(&["traces", trace_id], &[]).await
    }

    async fn list_observations(&self, query: ObservationQuery) -> Result<Page<Observation>> {
        self.get(&["observations"], &query.to_params()).await
    }

    async fn get_observation(&self, observation_id: &str) -> Result<Observation> {
        self.get(&["observations", observation_id], &[]).await
    }
}
