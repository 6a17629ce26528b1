use chrono::{DateTime, Utc};

use crate::ids::{CourseId, SegmentId};
use crate::review::ReviewRecord;

/// Lifecycle of one transcript segment as reported by the pipeline.
///
/// The wire protocol carries free-form status strings; this enum is the
/// single place they are interpreted. `is_terminal`/`is_active` replace
/// per-call-site string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentStatus {
    Pending,
    Queued,
    Downloading,
    Extracting,
    Transcribing,
    Completed,
    Failed,
    Aborted,
}

impl SegmentStatus {
    /// Interpret a backend status string. Unknown values fall back to
    /// `Pending` rather than failing: the payload is untrusted.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "queued" => SegmentStatus::Queued,
            "downloading" => SegmentStatus::Downloading,
            // Older pipeline versions report "processing" for the
            // audio-extraction stage.
            "extracting" | "processing" => SegmentStatus::Extracting,
            "transcribing" => SegmentStatus::Transcribing,
            "completed" => SegmentStatus::Completed,
            "failed" | "error" => SegmentStatus::Failed,
            "aborted" | "cancelled" => SegmentStatus::Aborted,
            _ => SegmentStatus::Pending,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            SegmentStatus::Pending => "pending",
            SegmentStatus::Queued => "queued",
            SegmentStatus::Downloading => "downloading",
            SegmentStatus::Extracting => "extracting",
            SegmentStatus::Transcribing => "transcribing",
            SegmentStatus::Completed => "completed",
            SegmentStatus::Failed => "failed",
            SegmentStatus::Aborted => "aborted",
        }
    }

    /// Terminal states never transition further without an explicit
    /// redo/restart trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SegmentStatus::Completed
                | SegmentStatus::Failed
                | SegmentStatus::Aborted
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SegmentStatus::Queued
                | SegmentStatus::Downloading
                | SegmentStatus::Extracting
                | SegmentStatus::Transcribing
        )
    }
}

impl std::fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// Quality preset the transcription engine ran with. The backend may
/// escalate through presets on its own; the client only reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QualityPreset {
    Fast,
    Balanced,
    High,
    Premium,
}

impl QualityPreset {
    pub fn from_wire(preset: &str) -> Option<Self> {
        match preset {
            "fast" => Some(QualityPreset::Fast),
            "balanced" => Some(QualityPreset::Balanced),
            "high" => Some(QualityPreset::High),
            "premium" => Some(QualityPreset::Premium),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            QualityPreset::Fast => "fast",
            QualityPreset::Balanced => "balanced",
            QualityPreset::High => "high",
            QualityPreset::Premium => "premium",
        }
    }
}

/// Wall-clock timing of the last processing run for a segment.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentTiming {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
}

/// Transcription metadata attached once a transcript exists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranscriptionInfo {
    pub preset: Option<QualityPreset>,
    pub language: Option<String>,
    /// Mean per-word probability from the engine, 0.0..=1.0.
    pub mean_confidence: Option<f32>,
}

/// Full authoritative segment record.
///
/// This is the shape returned by the full-record endpoint and used to
/// overwrite any locally held optimistic copy after reconciliation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub id: SegmentId,
    pub course_id: CourseId,
    pub title: String,
    pub position: u32,
    pub status: SegmentStatus,
    pub is_processing: bool,
    pub error_message: Option<String>,
    pub transcript_url: Option<String>,
    pub audio_url: Option<String>,
    pub progress_percentage: Option<f32>,
    pub timing: Option<SegmentTiming>,
    pub transcription: Option<TranscriptionInfo>,
    pub review: Option<ReviewRecord>,
    pub updated_at: DateTime<Utc>,
}

/// Ingest source a course came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CatalogSource {
    Channels,
    TrueFire,
}

impl CatalogSource {
    pub fn from_wire(source: &str) -> Option<Self> {
        match source {
            "channels" => Some(CatalogSource::Channels),
            "truefire" => Some(CatalogSource::TrueFire),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            CatalogSource::Channels => "channels",
            CatalogSource::TrueFire => "truefire",
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// Catalog row for a course and its aggregate segment progress.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Course {
    pub id: CourseId,
    pub source: Option<CatalogSource>,
    pub title: String,
    pub segment_count: u64,
    pub completed_segments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_mapping_is_lossy_but_total() {
        assert_eq!(
            SegmentStatus::from_wire("processing"),
            SegmentStatus::Extracting
        );
        assert_eq!(
            SegmentStatus::from_wire("cancelled"),
            SegmentStatus::Aborted
        );
        // Unknown strings must not panic or error.
        assert_eq!(
            SegmentStatus::from_wire("garbage"),
            SegmentStatus::Pending
        );
    }

    #[test]
    fn terminal_and_active_partition_the_lifecycle() {
        let all = [
            SegmentStatus::Pending,
            SegmentStatus::Queued,
            SegmentStatus::Downloading,
            SegmentStatus::Extracting,
            SegmentStatus::Transcribing,
            SegmentStatus::Completed,
            SegmentStatus::Failed,
            SegmentStatus::Aborted,
        ];
        for status in all {
            assert!(
                !(status.is_terminal() && status.is_active()),
                "{status} is both terminal and active"
            );
        }
        assert!(SegmentStatus::Completed.is_terminal());
        assert!(SegmentStatus::Transcribing.is_active());
        // Pending is neither: not yet queued, not finished.
        assert!(!SegmentStatus::Pending.is_terminal());
        assert!(!SegmentStatus::Pending.is_active());
    }
}
