//! Convenience re-exports for downstream crates.

pub use crate::error::{ModelError, Result as ModelResult};
pub use crate::ids::{CourseId, SegmentId};
pub use crate::job::{JobHandle, JobScope, SessionStatus};
pub use crate::progress::{PartialSnapshot, ProgressSnapshot, TargetProgress};
pub use crate::review::{ReviewRecord, ReviewStatus};
pub use crate::segment::{
    CatalogSource, Course, QualityPreset, Segment, SegmentStatus,
    SegmentTiming, TranscriptionInfo,
};
