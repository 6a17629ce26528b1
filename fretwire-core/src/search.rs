//! Debounced segment search with a cancel-superseded-request policy.
//!
//! Rapid input changes collapse into one request for the final value;
//! when a newer query fires while an older request is still in flight,
//! the older request task is aborted before the new one is issued, so
//! only the most recent query's response ever reaches the consumer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use fretwire_model::Segment;

use crate::error::Result;

/// Search backend seam; implemented by [`crate::ApiClient`].
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Segment>>;
}

/// Result of one issued search, tagged with the query it answered.
#[derive(Debug)]
pub struct SearchOutcome {
    pub query: String,
    pub result: Result<Vec<Segment>>,
}

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debouncing front-end over a [`SearchApi`].
///
/// Dropping the handle shuts the driver down and aborts any in-flight
/// request.
#[derive(Debug)]
pub struct DebouncedSearch {
    queries: mpsc::Sender<String>,
}

impl DebouncedSearch {
    /// Spawn the driver task; returns the input handle and the outcome
    /// stream.
    pub fn spawn(
        api: Arc<dyn SearchApi>,
        debounce: Duration,
    ) -> (Self, mpsc::Receiver<SearchOutcome>) {
        let (queries_tx, queries_rx) = mpsc::channel(16);
        let (outcomes_tx, outcomes_rx) = mpsc::channel(16);
        tokio::spawn(drive(api, debounce, queries_rx, outcomes_tx));
        (Self { queries: queries_tx }, outcomes_rx)
    }

    /// Record a new input value, re-arming the debounce window. Returns
    /// false once the driver has shut down.
    pub async fn submit(&self, query: impl Into<String>) -> bool {
        self.queries.send(query.into()).await.is_ok()
    }
}

async fn drive(
    api: Arc<dyn SearchApi>,
    debounce: Duration,
    mut queries: mpsc::Receiver<String>,
    outcomes: mpsc::Sender<SearchOutcome>,
) {
    let mut pending: Option<String> = None;
    let mut deadline = Instant::now();
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            received = queries.recv() => match received {
                Some(query) => {
                    pending = Some(query);
                    deadline = Instant::now() + debounce;
                }
                // Input handle dropped: shut down.
                None => break,
            },
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some(query) = pending.take() {
                    // Cancel the superseded request before issuing.
                    if let Some(previous) = in_flight.take() {
                        debug!("aborting superseded search request");
                        previous.abort();
                    }
                    let api = Arc::clone(&api);
                    let outcomes = outcomes.clone();
                    in_flight = Some(tokio::spawn(async move {
                        let result = api.search(&query).await;
                        let _ = outcomes
                            .send(SearchOutcome { query, result })
                            .await;
                    }));
                }
            }
        }
    }

    if let Some(previous) = in_flight.take() {
        previous.abort();
    }
}
