//! Plain-text rendering for terminal output.

use std::fmt::Write;

use fretwire_model::{Course, ProgressSnapshot, Segment, SessionStatus};

pub fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let mut line = format!(
        "processed {}/{} ({} succeeded, {} failed, {} skipped) - {} processing, {} queued",
        snapshot.processed(),
        snapshot.total,
        snapshot.succeeded,
        snapshot.failed,
        snapshot.skipped,
        snapshot.processing,
        snapshot.queued
    );
    if !snapshot.per_target.is_empty() {
        let done = snapshot
            .per_target
            .values()
            .filter(|t| t.total > 0 && t.completed >= t.total)
            .count();
        let _ = write!(
            line,
            " - {done}/{} courses complete",
            snapshot.per_target.len()
        );
    }
    line
}

pub fn terminal_line(
    status: SessionStatus,
    snapshot: &ProgressSnapshot,
) -> String {
    match status {
        SessionStatus::CompletedSuccess => format!(
            "job completed: {}/{} processed ({} failed, {} skipped)",
            snapshot.processed(),
            snapshot.total,
            snapshot.failed,
            snapshot.skipped
        ),
        SessionStatus::StalledTimeout => format!(
            "job stalled at {}/{} processed",
            snapshot.processed(),
            snapshot.total
        ),
        SessionStatus::AbsoluteTimeout => format!(
            "job timed out at {}/{} processed",
            snapshot.processed(),
            snapshot.total
        ),
        SessionStatus::Error => "job monitoring failed".to_string(),
        SessionStatus::Running => "job running".to_string(),
    }
}

pub fn segment(segment: &Segment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "segment {} ({})", segment.id, segment.status);
    let _ = writeln!(out, "  title: {}", segment.title);
    let _ = writeln!(
        out,
        "  course: {} (position {})",
        segment.course_id, segment.position
    );
    if let Some(pct) = segment.progress_percentage {
        let _ = writeln!(out, "  progress: {pct:.0}%");
    }
    if let Some(url) = &segment.transcript_url {
        let _ = writeln!(out, "  transcript: {url}");
    }
    if let Some(url) = &segment.audio_url {
        let _ = writeln!(out, "  audio: {url}");
    }
    if let Some(message) = &segment.error_message {
        let _ = writeln!(out, "  error: {message}");
    }
    if let Some(info) = &segment.transcription {
        if let Some(preset) = info.preset {
            let _ = writeln!(out, "  preset: {}", preset.as_wire());
        }
        if let Some(language) = &info.language {
            let _ = writeln!(out, "  language: {language}");
        }
        if let Some(confidence) = info.mean_confidence {
            let _ = writeln!(out, "  confidence: {confidence:.2}");
        }
    }
    if let Some(review) = &segment.review {
        let _ = writeln!(
            out,
            "  review: {} by {} - {}",
            review.status, review.reviewed_by, review.feedback
        );
    }
    out.trim_end().to_string()
}

pub fn course_rows(courses: &[Course]) -> String {
    let mut out = String::new();
    for course in courses {
        let source = course
            .source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<38} {:<9} {:>5}/{:<5} {}",
            course.id,
            source,
            course.completed_segments,
            course.segment_count,
            course.title
        );
    }
    out
}
