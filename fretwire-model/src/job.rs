use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::{CourseId, SegmentId};

/// Breadth of one tracked unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JobScope {
    SingleSegment,
    SingleCourseBulk,
    GlobalBulk,
}

impl std::fmt::Display for JobScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            JobScope::SingleSegment => "single-segment",
            JobScope::SingleCourseBulk => "course-bulk",
            JobScope::GlobalBulk => "global-bulk",
        };
        write!(f, "{label}")
    }
}

/// Identifies one tracked server-side job from trigger to terminal state.
///
/// Created when a trigger action succeeds and dropped when polling stops.
/// `started_at` anchors absolute-timeout calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobHandle {
    pub job_id: Uuid,
    pub scope: JobScope,
    /// Segment or course being processed; absent for the global scope.
    pub target: Option<Uuid>,
    pub started_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn single_segment(segment: SegmentId) -> Self {
        JobHandle {
            job_id: Uuid::now_v7(),
            scope: JobScope::SingleSegment,
            target: Some(segment.to_uuid()),
            started_at: Utc::now(),
        }
    }

    pub fn course_bulk(course: CourseId) -> Self {
        JobHandle {
            job_id: Uuid::now_v7(),
            scope: JobScope::SingleCourseBulk,
            target: Some(course.to_uuid()),
            started_at: Utc::now(),
        }
    }

    pub fn global_bulk() -> Self {
        JobHandle {
            job_id: Uuid::now_v7(),
            scope: JobScope::GlobalBulk,
            target: None,
            started_at: Utc::now(),
        }
    }
}

/// Outcome classification of one polling session.
///
/// `Running` is the only non-terminal state; there are no transitions out
/// of a terminal state for the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SessionStatus {
    Running,
    CompletedSuccess,
    StalledTimeout,
    AbsoluteTimeout,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::Running => "running",
            SessionStatus::CompletedSuccess => "completed",
            SessionStatus::StalledTimeout => "stalled",
            SessionStatus::AbsoluteTimeout => "timed-out",
            SessionStatus::Error => "error",
        };
        write!(f, "{label}")
    }
}
