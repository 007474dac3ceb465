//! HTTP client for one platform instance
//!
//! Listing goes through the table API, field sets through the record XML
//! export. Requests are sent one at a time with basic credentials.

use async_trait::async_trait;
use recdiff_common::config::{AppConfig, InstanceConfig};
use recdiff_common::FieldSet;
use std::time::Duration;
use tracing::debug;

use super::listing::parse_listing;
use super::xml_export::parse_export;
use super::{RecordCatalog, RecordRef, RecordSource, SourceError};

const USER_AGENT: &str = concat!("recdiff/", env!("CARGO_PKG_VERSION"));

/// Longest body excerpt kept in a status error
const ERROR_EXCERPT_CHARS: usize = 200;

/// Client for one instance
pub struct InstanceClient {
    http_client: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    label: String,
    page_size: u32,
}

impl InstanceClient {
    /// Create a client for `base_url` (scheme and host, no trailing slash)
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http_client,
            label: base_url.clone(),
            base_url,
            user: user.into(),
            password: password.into(),
            page_size,
        })
    }

    /// Create a client from one instance section of the configuration
    pub fn from_config(instance: &InstanceConfig, config: &AppConfig) -> recdiff_common::Result<Self> {
        let password = instance.password()?;
        let client = Self::new(
            instance.base_url(),
            instance.user.clone(),
            password,
            config.page_size,
            Duration::from_secs(config.request_timeout_secs),
        )
        .map_err(|e| recdiff_common::Error::HttpClient {
            instance: instance.label.clone(),
            reason: e.to_string(),
        })?;
        Ok(client.with_label(instance.label.clone()))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `base_url` extended by `segments`, each one percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, SourceError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SourceError::Parse(format!("base URL {:?}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Parse(format!("base URL {:?} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a GET and return the body of a successful response
    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, SourceError> {
        let response = request
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_EXCERPT_CHARS).collect();
            return Err(SourceError::Status(status.as_u16(), excerpt.trim().to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))
    }
}

#[async_trait]
impl RecordCatalog for InstanceClient {
    async fn list_records(&self, table: &str, query: &str) -> Result<Vec<RecordRef>, SourceError> {
        let url = self.endpoint(&["api", "now", "table", table])?;
        let limit = self.page_size.to_string();

        debug!(instance = %self.label, url = %url, query = %query, "Listing records");

        let request = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("sysparm_query", query), ("sysparm_limit", limit.as_str())]);

        let body = self.get_text(request).await?;
        parse_listing(&body)
    }
}

#[async_trait]
impl RecordSource for InstanceClient {
    async fn fetch_fields(&self, table: &str, sys_id: &str) -> Result<FieldSet, SourceError> {
        let file = format!("{}.do", table);
        let mut url = self.endpoint(&[file.as_str()])?;
        // `XML` is a bare flag with no value
        url.query_pairs_mut()
            .append_key_only("XML")
            .append_pair("sys_id", sys_id);

        debug!(instance = %self.label, url = %url, "Fetching record export");

        let body = self.get_text(self.http_client.get(url)).await?;
        parse_export(&body)
    }
}
