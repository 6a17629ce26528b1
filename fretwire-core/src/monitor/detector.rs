use std::time::Duration;

use fretwire_model::{ProgressSnapshot, SessionStatus};

use super::MonitorPolicy;

/// Control decision for one observed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Complete,
    Stalled,
    TimedOut,
    Failed,
}

/// Classifies snapshots into continue/terminal decisions.
///
/// Latches on the first terminal decision: every later observation for
/// the same handle is a no-op, so a poller that was not stopped promptly
/// cannot emit a second terminal event.
#[derive(Debug)]
pub struct Detector {
    policy: MonitorPolicy,
    last_processed: u64,
    no_progress: u32,
    consecutive_errors: u32,
    latched: Option<SessionStatus>,
}

impl Detector {
    pub fn new(policy: MonitorPolicy) -> Self {
        Detector {
            policy,
            last_processed: 0,
            no_progress: 0,
            consecutive_errors: 0,
            latched: None,
        }
    }

    /// Terminal status reached so far, if any.
    pub fn latched(&self) -> Option<SessionStatus> {
        self.latched
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Evaluate a successful poll. `elapsed` is wall-clock time since
    /// the session started.
    pub fn observe(
        &mut self,
        snapshot: &ProgressSnapshot,
        elapsed: Duration,
    ) -> Decision {
        if self.latched.is_some() {
            return Decision::Continue;
        }
        self.consecutive_errors = 0;

        // Completion wins over stall and timeout on the same tick.
        if snapshot.is_terminal() {
            self.latched = Some(SessionStatus::CompletedSuccess);
            return Decision::Complete;
        }

        if let Some(limit) = self.policy.absolute_timeout
            && elapsed >= limit
        {
            self.latched = Some(SessionStatus::AbsoluteTimeout);
            return Decision::TimedOut;
        }

        let processed = snapshot.processed();
        if processed > self.last_processed {
            self.last_processed = processed;
            self.no_progress = 0;
        } else {
            self.no_progress += 1;
            if self.no_progress >= self.policy.stall_ticks {
                self.latched = Some(SessionStatus::StalledTimeout);
                return Decision::Stalled;
            }
        }
        Decision::Continue
    }

    /// Evaluate a failed poll.
    pub fn observe_error(&mut self) -> Decision {
        if self.latched.is_some() {
            return Decision::Continue;
        }
        self.consecutive_errors += 1;
        if self.consecutive_errors >= self.policy.max_consecutive_errors {
            self.latched = Some(SessionStatus::Error);
            return Decision::Failed;
        }
        Decision::Continue
    }
}
