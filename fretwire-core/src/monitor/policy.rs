use std::time::Duration;

use fretwire_model::JobScope;

/// Per-scope polling and termination thresholds.
///
/// The two bulk scopes carry an absolute timeout on top of stall
/// detection; the single-segment scope intentionally has none and relies
/// on stall detection plus the consecutive-error limit. The asymmetry
/// matches observed pipeline behavior and is kept as explicit
/// configuration so callers can override any field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorPolicy {
    /// Cadence between status polls.
    pub poll_interval: Duration,
    /// Consecutive polls without forward progress before the session is
    /// declared stalled. At the default 3s cadence, 40 ticks is roughly
    /// two minutes of silence.
    pub stall_ticks: u32,
    /// Hard wall-clock ceiling for the whole session, where configured.
    pub absolute_timeout: Option<Duration>,
    /// Consecutive failed polls before the session escalates to Error.
    pub max_consecutive_errors: u32,
}

impl MonitorPolicy {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
    pub const DEFAULT_STALL_TICKS: u32 = 40;
    pub const DEFAULT_ERROR_LIMIT: u32 = 10;
    pub const BULK_ABSOLUTE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

    pub fn for_scope(scope: JobScope) -> Self {
        let absolute_timeout = match scope {
            JobScope::SingleSegment => None,
            JobScope::SingleCourseBulk | JobScope::GlobalBulk => {
                Some(Self::BULK_ABSOLUTE_TIMEOUT)
            }
        };
        MonitorPolicy {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            stall_ticks: Self::DEFAULT_STALL_TICKS,
            absolute_timeout,
            max_consecutive_errors: Self::DEFAULT_ERROR_LIMIT,
        }
    }
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self::for_scope(JobScope::SingleSegment)
    }
}
