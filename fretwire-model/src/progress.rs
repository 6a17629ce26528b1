use std::collections::BTreeMap;

use uuid::Uuid;

/// Nested completion pair for one course or segment inside a bulk job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetProgress {
    pub completed: u64,
    pub total: u64,
}

/// One point-in-time read of job state, normalized from whichever status
/// endpoint answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    /// Total units of work expected. The server may revise this between
    /// polls when it recomputes scope.
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub processing: u64,
    pub queued: u64,
    pub per_target: BTreeMap<Uuid, TargetProgress>,
}

impl ProgressSnapshot {
    /// Units that reached a final per-unit outcome.
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed + self.skipped
    }

    /// Terminal iff everything expected has been processed and nothing
    /// is in flight or waiting. A zero-total snapshot is not terminal:
    /// the server has not computed the job's scope yet.
    pub fn is_terminal(&self) -> bool {
        self.total > 0
            && self.processed() >= self.total
            && self.processing == 0
            && self.queued == 0
    }

    /// Last-write-wins merge of a partial reading into this snapshot.
    /// Fields absent from `partial` are left untouched; `per_target`
    /// entries merge keywise.
    pub fn apply(&mut self, partial: PartialSnapshot) {
        if let Some(total) = partial.total {
            self.total = total;
        }
        if let Some(succeeded) = partial.succeeded {
            self.succeeded = succeeded;
        }
        if let Some(failed) = partial.failed {
            self.failed = failed;
        }
        if let Some(skipped) = partial.skipped {
            self.skipped = skipped;
        }
        if let Some(processing) = partial.processing {
            self.processing = processing;
        }
        if let Some(queued) = partial.queued {
            self.queued = queued;
        }
        for (target, progress) in partial.per_target {
            self.per_target.insert(target, progress);
        }
    }
}

/// A reading from one endpoint: only the fields that endpoint carries.
/// The merge order is decided by the caller, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSnapshot {
    pub total: Option<u64>,
    pub succeeded: Option<u64>,
    pub failed: Option<u64>,
    pub skipped: Option<u64>,
    pub processing: Option<u64>,
    pub queued: Option<u64>,
    pub per_target: BTreeMap<Uuid, TargetProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_never_terminal() {
        let snapshot = ProgressSnapshot::default();
        assert!(!snapshot.is_terminal());
    }

    #[test]
    fn terminal_requires_drained_queues() {
        let mut snapshot = ProgressSnapshot {
            total: 10,
            succeeded: 9,
            failed: 1,
            ..Default::default()
        };
        assert!(snapshot.is_terminal());

        snapshot.queued = 1;
        assert!(!snapshot.is_terminal());

        snapshot.queued = 0;
        snapshot.processing = 2;
        assert!(!snapshot.is_terminal());
    }

    #[test]
    fn skipped_units_count_as_processed() {
        let snapshot = ProgressSnapshot {
            total: 5,
            succeeded: 2,
            failed: 1,
            skipped: 2,
            ..Default::default()
        };
        assert_eq!(snapshot.processed(), 5);
        assert!(snapshot.is_terminal());
    }

    #[test]
    fn apply_is_last_write_wins_per_field() {
        let mut snapshot = ProgressSnapshot {
            total: 100,
            succeeded: 5,
            ..Default::default()
        };
        snapshot.apply(PartialSnapshot {
            succeeded: Some(7),
            queued: Some(3),
            ..Default::default()
        });
        // Untouched fields survive, provided fields overwrite.
        assert_eq!(snapshot.total, 100);
        assert_eq!(snapshot.succeeded, 7);
        assert_eq!(snapshot.queued, 3);
    }

    #[test]
    fn per_target_entries_merge_keywise() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let mut snapshot = ProgressSnapshot::default();
        snapshot.per_target.insert(
            a,
            TargetProgress {
                completed: 1,
                total: 4,
            },
        );

        let mut partial = PartialSnapshot::default();
        partial.per_target.insert(
            a,
            TargetProgress {
                completed: 2,
                total: 4,
            },
        );
        partial.per_target.insert(
            b,
            TargetProgress {
                completed: 0,
                total: 9,
            },
        );
        snapshot.apply(partial);

        assert_eq!(snapshot.per_target[&a].completed, 2);
        assert_eq!(snapshot.per_target[&b].total, 9);
    }
}
