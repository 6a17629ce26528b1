//! Tolerant payload parsing for the admin API.
//!
//! Every numeric field the backend sends is treated as optional and
//! untrusted; only record identity (segment/course IDs) is required.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use fretwire_model::{
    CatalogSource, Course, CourseId, PartialSnapshot, QualityPreset,
    ReviewRecord, ReviewStatus, Segment, SegmentId, SegmentStatus,
    SegmentTiming, TranscriptionInfo,
};

use crate::error::{MonitorError, Result};
use crate::monitor::adapters::adapt_trigger_stats;
use crate::wire;

/// Outcome of a job-trigger request, kept distinct from later polling
/// errors so "job never started" is distinguishable from "job started
/// but monitoring failed".
#[derive(Debug, Clone)]
pub struct TriggerOutcome {
    pub message: Option<String>,
    pub total_segments: u64,
    pub total_courses: u64,
    pub queued_downloads: u64,
    /// Initial reading to seed a monitor's snapshot with.
    pub seed: PartialSnapshot,
}

impl TriggerOutcome {
    pub fn from_value(value: &Value) -> Self {
        let stats = value.get("stats").unwrap_or(&Value::Null);
        TriggerOutcome {
            message: wire::str_field(value, "message").map(str::to_string),
            total_segments: wire::u64_field(stats, "total_segments"),
            total_courses: wire::u64_field(stats, "total_courses"),
            queued_downloads: wire::u64_field(stats, "queued_downloads"),
            seed: adapt_trigger_stats(value),
        }
    }
}

/// One page of the course catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseListPage {
    pub items: Vec<Course>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl CourseListPage {
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page).max(1)
    }
}

/// Review submission body: `{feedback, status}`.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSubmission {
    pub feedback: String,
    pub status: ReviewStatus,
}

/// Parse a full segment record. Identity fields are required; all else
/// degrades to defaults per the coercion policy.
pub fn parse_segment(value: &Value) -> Result<Segment> {
    let id = wire::str_field(value, "id").ok_or_else(|| {
        MonitorError::MalformedPayload("segment record without id".into())
    })?;
    let id = SegmentId::from_string(id)?;
    let course_id = wire::str_field(value, "course_id").ok_or_else(|| {
        MonitorError::MalformedPayload(format!(
            "segment {id} without course_id"
        ))
    })?;
    let course_id = CourseId::from_string(course_id)?;

    let status = SegmentStatus::from_wire(
        wire::str_field(value, "status").unwrap_or(""),
    );

    Ok(Segment {
        id,
        course_id,
        title: wire::str_field(value, "title").unwrap_or("").to_string(),
        position: u32::try_from(wire::u64_field(value, "position"))
            .unwrap_or(u32::MAX),
        status,
        is_processing: wire::bool_field(value, "is_processing"),
        error_message: wire::str_field(value, "error_message")
            .map(str::to_string),
        transcript_url: wire::str_field(value, "transcript_url")
            .map(str::to_string),
        audio_url: wire::str_field(value, "audio_url").map(str::to_string),
        progress_percentage: wire::f32_field(value, "progress_percentage")
            .map(|p| p.min(100.0)),
        timing: value.get("timing").and_then(parse_timing),
        transcription: value.get("transcription").and_then(parse_transcription),
        review: value.get("review").and_then(parse_review),
        updated_at: wire::datetime_field(value, "updated_at")
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    })
}

fn parse_timing(value: &Value) -> Option<SegmentTiming> {
    if !value.is_object() {
        return None;
    }
    Some(SegmentTiming {
        started_at: wire::datetime_field(value, "started_at"),
        finished_at: wire::datetime_field(value, "finished_at"),
        duration_secs: wire::f64_field(value, "duration_secs"),
    })
}

fn parse_transcription(value: &Value) -> Option<TranscriptionInfo> {
    if !value.is_object() {
        return None;
    }
    Some(TranscriptionInfo {
        preset: wire::str_field(value, "preset")
            .and_then(QualityPreset::from_wire),
        language: wire::str_field(value, "language").map(str::to_string),
        mean_confidence: wire::f32_field(value, "mean_confidence")
            .map(|c| c.min(1.0)),
    })
}

fn parse_review(value: &Value) -> Option<ReviewRecord> {
    let status = wire::str_field(value, "status")?
        .parse::<ReviewStatus>()
        .ok()?;
    Some(ReviewRecord {
        status,
        feedback: wire::str_field(value, "feedback")
            .unwrap_or("")
            .to_string(),
        reviewed_by: wire::str_field(value, "reviewed_by")
            .unwrap_or("")
            .to_string(),
        reviewed_at: wire::datetime_field(value, "reviewed_at")
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    })
}

/// Parse one catalog page. Individual malformed rows are skipped, not
/// fatal: one broken course must not blank the whole listing.
pub fn parse_course_page(value: &Value) -> CourseListPage {
    let mut items = Vec::new();
    if let Some(Value::Array(raw)) = value.get("courses") {
        for entry in raw {
            match parse_course(entry) {
                Ok(course) => items.push(course),
                Err(err) => {
                    warn!(error = %err, "skipping malformed course row");
                }
            }
        }
    }
    CourseListPage {
        items,
        page: wire::u64_field(value, "page").max(1),
        per_page: wire::u64_field(value, "per_page"),
        total: wire::u64_field(value, "total"),
    }
}

fn parse_course(value: &Value) -> Result<Course> {
    let id = wire::str_field(value, "id").ok_or_else(|| {
        MonitorError::MalformedPayload("course row without id".into())
    })?;
    Ok(Course {
        id: CourseId::from_string(id)?,
        source: wire::str_field(value, "source")
            .and_then(CatalogSource::from_wire),
        title: wire::str_field(value, "title").unwrap_or("").to_string(),
        segment_count: wire::u64_field(value, "segment_count"),
        completed_segments: wire::u64_field(value, "completed_segments"),
    })
}
