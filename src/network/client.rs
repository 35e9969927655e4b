//! HTTP client for fetching remote tables

use crate::config::SourceSettings;
use anyhow::Result;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client wrapper configured from source settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
}

/// Response returned by [`HttpClient`]
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.text)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&SourceSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &SourceSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout())
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy_url) = settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: settings.timeout(),
            user_agent: format!("sheetkb/{}", crate::VERSION),
        })
    }

    /// GET a URL with query parameters
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, reqwest::Error> {
        let mut req_builder = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        if !params.is_empty() {
            req_builder = req_builder.query(params);
        }

        let response = req_builder.send().await?;
        Self::parse_response(response).await
    }

    /// Parse response into HttpResponse
    async fn parse_response(response: Response) -> std::result::Result<HttpResponse, reqwest::Error> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            text,
            url,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
