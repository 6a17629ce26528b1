//! Job progress monitor: tracks one server-side job from trigger to a
//! terminal state by polling, aggregating heterogeneous counters,
//! detecting completion/stall/timeout, and reconciling against the
//! authoritative record.

pub mod adapters;
mod detector;
mod policy;

pub use detector::{Decision, Detector};
pub use policy::MonitorPolicy;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use fretwire_model::{
    Course, JobHandle, JobScope, PartialSnapshot, ProgressSnapshot, Segment,
    SegmentId, SessionStatus,
};

use crate::error::{MonitorError, Result};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Status source the monitor polls, kept behind a trait so tests can
/// script responses without a server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStatusApi: Send + Sync {
    /// One poll of the status endpoint(s) for this handle, returned as
    /// partial readings in the order they should merge.
    async fn poll(&self, handle: &JobHandle) -> Result<Vec<PartialSnapshot>>;

    /// Authoritative full-record fetch for single-segment reconciliation.
    async fn reconcile_segment(&self, id: SegmentId) -> Result<Segment>;

    /// Aggregate catalog refresh for bulk-scope reconciliation.
    async fn reconcile_catalog(&self) -> Result<Vec<Course>>;
}

/// Authoritative state fetched after a terminal transition.
#[derive(Debug, Clone)]
pub enum Reconciled {
    Segment(Box<Segment>),
    Catalog(Vec<Course>),
}

/// Updates delivered to the monitor's subscriber.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// Merged snapshot after a successful poll.
    Progress(ProgressSnapshot),
    /// A transient poll failure; polling continues.
    PollError { consecutive: u32, message: String },
    /// Exactly one per session.
    Terminal {
        status: SessionStatus,
        snapshot: ProgressSnapshot,
    },
    Reconciled(Reconciled),
    /// The authoritative refetch failed: the final state could not be
    /// confirmed. Not retried automatically.
    ReconcileFailed { message: String },
}

/// Handle to a running monitor: event stream plus a stop switch.
#[derive(Debug)]
pub struct MonitorSubscription {
    handle: JobHandle,
    events: mpsc::Receiver<MonitorEvent>,
    stop: Arc<AtomicBool>,
}

impl MonitorSubscription {
    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    /// Request the polling task to stop. Idempotent; an in-flight poll
    /// is not aborted, its late response is discarded.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Next event, or `None` once the session ended and the stream
    /// drained.
    pub async fn recv(&mut self) -> Option<MonitorEvent> {
        self.events.recv().await
    }
}

/// Spawns and owns per-handle polling sessions.
#[derive(Debug)]
pub struct JobMonitor;

impl JobMonitor {
    /// Start polling for `handle` with an empty initial snapshot.
    pub fn spawn(
        handle: JobHandle,
        api: Arc<dyn JobStatusApi>,
        policy: MonitorPolicy,
    ) -> MonitorSubscription {
        Self::spawn_seeded(handle, PartialSnapshot::default(), api, policy)
    }

    /// Start polling with an initial reading, typically the stats object
    /// from the trigger response.
    pub fn spawn_seeded(
        handle: JobHandle,
        seed: PartialSnapshot,
        api: Arc<dyn JobStatusApi>,
        policy: MonitorPolicy,
    ) -> MonitorSubscription {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let session = Session {
            handle: handle.clone(),
            api,
            policy,
            stop: Arc::clone(&stop),
            events: events_tx,
        };
        tokio::spawn(session.run(seed));
        MonitorSubscription {
            handle,
            events: events_rx,
            stop,
        }
    }

    /// Start a single-segment monitor only when the segment is still
    /// active. Callers fetch the record once first; a terminal segment
    /// never gets a poller.
    pub fn spawn_if_active(
        segment: &Segment,
        api: Arc<dyn JobStatusApi>,
        policy: MonitorPolicy,
    ) -> Option<MonitorSubscription> {
        if segment.status.is_terminal() {
            return None;
        }
        Some(Self::spawn(
            JobHandle::single_segment(segment.id),
            api,
            policy,
        ))
    }
}

struct Session {
    handle: JobHandle,
    api: Arc<dyn JobStatusApi>,
    policy: MonitorPolicy,
    stop: Arc<AtomicBool>,
    events: mpsc::Sender<MonitorEvent>,
}

impl Session {
    async fn run(self, seed: PartialSnapshot) {
        let started = Instant::now();
        let mut ticker = interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut detector = Detector::new(self.policy.clone());
        let mut snapshot = ProgressSnapshot::default();
        snapshot.apply(seed);

        info!(
            job = %self.handle.job_id,
            scope = %self.handle.scope,
            "monitor session started"
        );

        loop {
            // First tick completes immediately: lowest latency to a
            // first status reading.
            ticker.tick().await;
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let polled = self.api.poll(&self.handle).await;

            // A stop issued while the request was in flight: the late
            // response must not mutate anything observable.
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let decision = match polled {
                Ok(partials) => {
                    let prev = (
                        snapshot.succeeded,
                        snapshot.failed,
                        snapshot.skipped,
                    );
                    let prev_processed = snapshot.processed();
                    for partial in partials {
                        snapshot.apply(partial);
                    }
                    if snapshot.processed() < prev_processed {
                        warn!(
                            job = %self.handle.job_id,
                            reported = snapshot.processed(),
                            high_water = prev_processed,
                            "processed count regressed; keeping high-water counters"
                        );
                        snapshot.succeeded = prev.0;
                        snapshot.failed = prev.1;
                        snapshot.skipped = prev.2;
                    }
                    debug!(
                        job = %self.handle.job_id,
                        processed = snapshot.processed(),
                        total = snapshot.total,
                        "poll tick"
                    );
                    if self
                        .events
                        .send(MonitorEvent::Progress(snapshot.clone()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                    detector.observe(&snapshot, started.elapsed())
                }
                Err(err) => {
                    let decision = detector.observe_error();
                    warn!(
                        job = %self.handle.job_id,
                        consecutive = detector.consecutive_errors(),
                        error = %err,
                        "status poll failed"
                    );
                    if self
                        .events
                        .send(MonitorEvent::PollError {
                            consecutive: detector.consecutive_errors(),
                            message: err.to_string(),
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                    decision
                }
            };

            let status = match decision {
                Decision::Continue => continue,
                Decision::Complete => SessionStatus::CompletedSuccess,
                Decision::Stalled => SessionStatus::StalledTimeout,
                Decision::TimedOut => SessionStatus::AbsoluteTimeout,
                Decision::Failed => SessionStatus::Error,
            };

            info!(
                job = %self.handle.job_id,
                status = %status,
                processed = snapshot.processed(),
                total = snapshot.total,
                "monitor session reached a terminal state"
            );
            if self
                .events
                .send(MonitorEvent::Terminal {
                    status,
                    snapshot: snapshot.clone(),
                })
                .await
                .is_err()
            {
                break;
            }

            // No reconciliation on Error: the status source itself is
            // unreachable, the refetch would only mask that.
            if status != SessionStatus::Error {
                let event = match reconcile(&self.handle, self.api.as_ref())
                    .await
                {
                    Ok(reconciled) => MonitorEvent::Reconciled(reconciled),
                    Err(err) => MonitorEvent::ReconcileFailed {
                        message: err.to_string(),
                    },
                };
                let _ = self.events.send(event).await;
            }
            break;
        }
    }
}

/// One authoritative fetch per terminal transition. Bulk scopes refresh
/// the aggregate catalog view only; per-segment records are each
/// segment's own concern.
async fn reconcile(
    handle: &JobHandle,
    api: &dyn JobStatusApi,
) -> Result<Reconciled> {
    match handle.scope {
        JobScope::SingleSegment => {
            let target = handle.target.ok_or_else(|| {
                MonitorError::InvalidHandle(
                    "single-segment handle without a target".into(),
                )
            })?;
            let segment = api.reconcile_segment(SegmentId(target)).await?;
            Ok(Reconciled::Segment(Box::new(segment)))
        }
        JobScope::SingleCourseBulk | JobScope::GlobalBulk => {
            let courses = api.reconcile_catalog().await?;
            Ok(Reconciled::Catalog(courses))
        }
    }
}
