//! HTTP client for the course explorer API

use super::query::CourseQuery;
use super::snapshot::{
    parse_course_detail, parse_department_listing, parse_section_detail, parse_section_snapshot,
    CourseDetail, DepartmentListing, SectionDetails, SectionSnapshot,
};
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Typed fetch failure.
///
/// `NotFound` is terminal for a watched section; `Transient` (network error,
/// timeout, or any non-404 error status) and `ParseFailure` are retryable and
/// must never retire a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    NotFound,
    Transient(Option<u16>),
    ParseFailure(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "course not found"),
            FetchError::Transient(Some(code)) => write!(f, "catalog returned status {}", code),
            FetchError::Transient(None) => write!(f, "catalog request failed"),
            FetchError::ParseFailure(cause) => {
                write!(f, "could not decode catalog response: {}", cause)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// True for failures that leave a watch entry untouched
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotFound)
    }
}

/// Section fetch seam used by the poller; lets tests substitute the network
pub trait SectionFetch: Send + Sync {
    fn fetch_section(
        &self,
        query: &CourseQuery,
    ) -> impl Future<Output = Result<SectionSnapshot, FetchError>> + Send;
}

/// Client for the course explorer XML API.
///
/// The schedule base URL (year and term already substituted) is fixed at
/// construction. The inner reqwest client carries the request timeout and is
/// safe to share across concurrent lookups.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_body(&self, query: &CourseQuery) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, query.url_path());
        debug!(%url, "Fetching catalog resource");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| FetchError::Transient(None))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Transient(Some(status.as_u16())));
        }

        response.text().await.map_err(|_| FetchError::Transient(None))
    }

    /// Fetch one section's watch-facing snapshot
    pub async fn section_snapshot(
        &self,
        query: &CourseQuery,
    ) -> Result<SectionSnapshot, FetchError> {
        let body = self.get_body(query).await?;
        parse_section_snapshot(&body).map_err(|e| FetchError::ParseFailure(e.0))
    }

    /// Fetch one section's full meeting details (title, details)
    pub async fn section_detail(
        &self,
        query: &CourseQuery,
    ) -> Result<(String, SectionDetails), FetchError> {
        let body = self.get_body(query).await?;
        parse_section_detail(&body).map_err(|e| FetchError::ParseFailure(e.0))
    }

    /// Fetch a course's description fields and section list
    pub async fn course_detail(&self, query: &CourseQuery) -> Result<CourseDetail, FetchError> {
        let body = self.get_body(query).await?;
        parse_course_detail(&body).map_err(|e| FetchError::ParseFailure(e.0))
    }

    /// Fetch a department's course listing
    pub async fn department_listing(
        &self,
        query: &CourseQuery,
    ) -> Result<DepartmentListing, FetchError> {
        let body = self.get_body(query).await?;
        parse_department_listing(&body).map_err(|e| FetchError::ParseFailure(e.0))
    }
}

impl SectionFetch for CatalogClient {
    async fn fetch_section(&self, query: &CourseQuery) -> Result<SectionSnapshot, FetchError> {
        self.section_snapshot(query).await
    }
}
