use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ModelError;

/// Reviewer verdict on a transcript segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReviewStatus {
    Approved,
    NeedsRevision,
    Rejected,
}

impl ReviewStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::NeedsRevision => "needs_revision",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = ModelError;

    // Strict, unlike the lossy segment-status mapping: review statuses
    // originate from operator input and a typo must not silently approve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewStatus::Approved),
            "needs_revision" | "needs-revision" => {
                Ok(ReviewStatus::NeedsRevision)
            }
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(ModelError::InvalidRecord(format!(
                "unknown review status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// Human quality judgement attached to a transcript segment.
///
/// Overwritten wholesale on resubmission; removed by the clear action.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReviewRecord {
    pub status: ReviewStatus,
    pub feedback: String,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}
