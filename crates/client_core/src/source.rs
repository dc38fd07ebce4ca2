use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ItemPageResponse, NewsletterRequest, NewsletterResponse},
};
use tracing::debug;
use url::Url;

use crate::error::SourceError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the list view gets pages from after the server-rendered seed.
#[async_trait]
pub trait ItemPageSource: Send + Sync {
    async fn fetch_page(&self, code: &str, page: u32) -> Result<ItemPageResponse, SourceError>;
}

/// Where the newsletter form sends valid submissions.
#[async_trait]
pub trait SubscriptionSink: Send + Sync {
    async fn subscribe(&self, request: &NewsletterRequest)
        -> Result<NewsletterResponse, SourceError>;
}

#[derive(Clone)]
pub struct HttpDirectoryClient {
    http: Client,
    base_url: Url,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Unavailable(format!("base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ItemPageSource for HttpDirectoryClient {
    async fn fetch_page(&self, code: &str, page: u32) -> Result<ItemPageResponse, SourceError> {
        let url = self.endpoint(&["api", "category", code, "items"])?;
        debug!(%url, page, "fetching item page");
        let response = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl SubscriptionSink for HttpDirectoryClient {
    async fn subscribe(
        &self,
        request: &NewsletterRequest,
    ) -> Result<NewsletterResponse, SourceError> {
        let url = self.endpoint(&["api", "newsletter"])?;
        let response = self.http.post(url).json(request).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        ApiError::new(
            ErrorCode::Internal,
            if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        )
    });
    Err(SourceError::Api {
        status: status.as_u16(),
        error,
    })
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
