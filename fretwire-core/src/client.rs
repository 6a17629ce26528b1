//! HTTP client for the transcription pipeline's admin API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use fretwire_model::{
    Course, JobHandle, JobScope, PartialSnapshot, Segment, SegmentId,
};

use crate::api::routes::{self, v1};
use crate::api::types::{
    CourseListPage, ReviewSubmission, TriggerOutcome, parse_course_page,
    parse_segment,
};
use crate::error::{MonitorError, Result};
use crate::monitor::JobStatusApi;
use crate::monitor::adapters::{
    adapt_bulk_stats, adapt_bulk_status, adapt_segment_status,
};
use crate::search::SearchApi;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CATALOG_PAGE_SIZE: u64 = 25;

/// API client with bearer-token authentication support
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token_store: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field(
                "has_token",
                &self
                    .token_store
                    .try_read()
                    .map(|t| t.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| MonitorError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MonitorError::InvalidUrl(format!(
                "{base_url}: expected an http(s) URL"
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        debug!(%base_url, "creating API client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    /// Build a full URL from a route path. Absolute URLs pass through.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set (or clear) the bearer token attached to every request.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    pub async fn get_token(&self) -> Option<String> {
        self.token_store.read().await.clone()
    }

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.token_store.read().await.as_ref() {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            builder
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let builder = self.authorize(builder).await;
        let response = builder.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(MonitorError::Unauthorized),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(MonitorError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// The admin envelope: a `success: false` body is an error even on
    /// HTTP 200. Endpoints where `success` is a counter (bulk stats) are
    /// unaffected, the flag check only fires on a boolean `false`.
    fn check_envelope(value: &Value) -> Result<()> {
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected by server")
                .to_string();
            return Err(MonitorError::Api(message));
        }
        Ok(())
    }

    async fn get_value(&self, path: &str) -> Result<Value> {
        let url = self.build_url(path);
        debug!(%url, "GET");
        let value = self.execute(self.client.get(&url)).await?;
        Self::check_envelope(&value)?;
        Ok(value)
    }

    async fn post_value(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.build_url(path);
        debug!(%url, "POST");
        let mut builder = self.client.post(&url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        let value = self.execute(builder).await?;
        Self::check_envelope(&value)?;
        Ok(value)
    }

    async fn delete_value(&self, path: &str) -> Result<Value> {
        let url = self.build_url(path);
        debug!(%url, "DELETE");
        let value = self.execute(self.client.delete(&url)).await?;
        Self::check_envelope(&value)?;
        Ok(value)
    }
}

impl ApiClient {
    /// Processing status for one segment (raw payload; feed it through
    /// [`adapt_segment_status`] for the canonical reading).
    pub async fn segment_status(&self, id: SegmentId) -> Result<Value> {
        self.get_value(&routes::with_id(v1::segments::STATUS, id)).await
    }

    /// Authoritative full segment record.
    pub async fn fetch_segment(&self, id: SegmentId) -> Result<Segment> {
        let value =
            self.get_value(&routes::with_id(v1::segments::ITEM, id)).await?;
        parse_segment(value.get("segment").unwrap_or(&Value::Null))
    }

    /// Re-run transcription for a segment.
    pub async fn redo_transcription(
        &self,
        id: SegmentId,
    ) -> Result<TriggerOutcome> {
        let value = self
            .post_value(&routes::with_id(v1::segments::REDO, id), None)
            .await?;
        Ok(TriggerOutcome::from_value(&value))
    }

    /// Restart the entire processing chain (download, extraction, and
    /// transcription) for a segment.
    pub async fn restart_processing(
        &self,
        id: SegmentId,
    ) -> Result<TriggerOutcome> {
        let value = self
            .post_value(&routes::with_id(v1::segments::RESTART, id), None)
            .await?;
        Ok(TriggerOutcome::from_value(&value))
    }

    /// Abort in-flight processing for a segment.
    pub async fn abort_processing(&self, id: SegmentId) -> Result<()> {
        self.post_value(&routes::with_id(v1::segments::ABORT, id), None)
            .await
            .map(drop)
    }

    /// Queue a catalog-wide bulk download.
    pub async fn download_all_courses(&self) -> Result<TriggerOutcome> {
        let value = self.get_value(v1::catalog::DOWNLOAD_ALL).await?;
        Ok(TriggerOutcome::from_value(&value))
    }

    /// Bulk aggregate status (total plus per-course completion map).
    pub async fn bulk_download_status(&self) -> Result<Value> {
        self.get_value(v1::catalog::BULK_STATUS).await
    }

    /// Bulk outcome counters.
    pub async fn bulk_download_stats(&self) -> Result<Value> {
        self.get_value(v1::catalog::BULK_STATS).await
    }

    /// Attach or replace a review; the response is the full updated
    /// segment record.
    pub async fn submit_review(
        &self,
        id: SegmentId,
        submission: &ReviewSubmission,
    ) -> Result<Segment> {
        let body = serde_json::to_value(submission)?;
        let value = self
            .post_value(&routes::with_id(v1::segments::REVIEW, id), Some(body))
            .await?;
        parse_segment(value.get("segment").unwrap_or(&Value::Null))
    }

    /// Remove the review from a segment.
    pub async fn clear_review(&self, id: SegmentId) -> Result<Segment> {
        let value = self
            .delete_value(&routes::with_id(v1::segments::REVIEW, id))
            .await?;
        parse_segment(value.get("segment").unwrap_or(&Value::Null))
    }

    /// One page of the course catalog, optionally filtered.
    pub async fn list_courses(
        &self,
        page: u64,
        per_page: u64,
        query: Option<&str>,
    ) -> Result<CourseListPage> {
        let url = self.build_url(v1::catalog::COURSES);
        debug!(%url, page, "GET");
        let mut builder = self.client.get(&url).query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ]);
        if let Some(q) = query {
            builder = builder.query(&[("q", q)]);
        }
        let value = self.execute(builder).await?;
        Self::check_envelope(&value)?;
        Ok(parse_course_page(&value))
    }

    /// Full-text segment search.
    pub async fn search_segments(&self, query: &str) -> Result<Vec<Segment>> {
        let url = self.build_url(v1::segments::SEARCH);
        debug!(%url, %query, "GET");
        let builder = self.client.get(&url).query(&[("q", query)]);
        let value = self.execute(builder).await?;
        Self::check_envelope(&value)?;

        let mut segments = Vec::new();
        if let Some(Value::Array(raw)) = value.get("segments") {
            for entry in raw {
                match parse_segment(entry) {
                    Ok(segment) => segments.push(segment),
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "skipping malformed search hit"
                        );
                    }
                }
            }
        }
        Ok(segments)
    }
}

#[async_trait]
impl JobStatusApi for ApiClient {
    async fn poll(&self, handle: &JobHandle) -> Result<Vec<PartialSnapshot>> {
        match handle.scope {
            JobScope::SingleSegment => {
                let target = handle.target.ok_or_else(|| {
                    MonitorError::InvalidHandle(
                        "single-segment handle without a target".into(),
                    )
                })?;
                let value = self.segment_status(SegmentId(target)).await?;
                Ok(vec![adapt_segment_status(&value)])
            }
            JobScope::SingleCourseBulk | JobScope::GlobalBulk => {
                let status = self.bulk_download_status().await?;
                let stats = self.bulk_download_stats().await?;
                Ok(vec![adapt_bulk_status(&status), adapt_bulk_stats(&stats)])
            }
        }
    }

    async fn reconcile_segment(&self, id: SegmentId) -> Result<Segment> {
        self.fetch_segment(id).await
    }

    async fn reconcile_catalog(&self) -> Result<Vec<Course>> {
        let page = self
            .list_courses(1, DEFAULT_CATALOG_PAGE_SIZE, None)
            .await?;
        Ok(page.items)
    }
}

#[async_trait]
impl SearchApi for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<Segment>> {
        self.search_segments(query).await
    }
}
